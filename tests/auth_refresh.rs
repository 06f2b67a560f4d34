//! End-to-end token flow against a mock backend: bearer decoration, one-shot
//! refresh-and-retry on 401, redirect on unrecoverable sessions.

use std::sync::Arc;

use digitizer_sdk::prelude::*;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

struct Fixture {
    server: ServerGuard,
    client: DigitizerClient,
    store: Arc<MemoryCredentialStore>,
    navigator: Arc<RecordingNavigator>,
}

async fn fixture(store: MemoryCredentialStore) -> Fixture {
    let server = Server::new_async().await;
    let store = Arc::new(store);
    let navigator = Arc::new(RecordingNavigator::new());
    let client = DigitizerClient::builder()
        .base_url(&server.url())
        .credential_store(store.clone())
        .navigator(navigator.clone())
        .build()
        .unwrap();
    Fixture {
        server,
        client,
        store,
        navigator,
    }
}

#[tokio::test]
async fn test_login_then_requests_carry_bearer() {
    let mut f = fixture(MemoryCredentialStore::new()).await;

    let login = f
        .server
        .mock("POST", "/api/token/")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({"username": "alice", "password": "Secret123"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A1", "refresh": "R1"}"#)
        .expect(1)
        .create_async()
        .await;
    let list = f
        .server
        .mock("GET", "/api/documents/")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    f.client.auth().login("alice", "Secret123").await.unwrap();
    let docs = f.client.documents().list().await.unwrap();

    assert!(docs.is_empty());
    login.assert_async().await;
    list.assert_async().await;
    assert_eq!(f.store.access_token().as_deref(), Some("A1"));
    assert_eq!(f.store.refresh_token().as_deref(), Some("R1"));
}

#[tokio::test]
async fn test_expired_access_token_refreshed_and_retried() {
    let mut f = fixture(MemoryCredentialStore::with_pair("A1", "R1")).await;

    let stale = f
        .server
        .mock("GET", "/api/documents/")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .with_body(r#"{"detail": "Given token not valid for any token type"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = f
        .server
        .mock("POST", "/api/token/refresh/")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({"refresh": "R1"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A2"}"#)
        .expect(1)
        .create_async()
        .await;
    let fresh = f
        .server
        .mock("GET", "/api/documents/")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let docs = f.client.documents().list().await.unwrap();

    assert!(docs.is_empty());
    stale.assert_async().await;
    refresh.assert_async().await;
    fresh.assert_async().await;
    assert_eq!(f.store.access_token().as_deref(), Some("A2"));
    assert_eq!(f.store.refresh_token().as_deref(), Some("R1"));
    assert!(f.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_retry_that_fails_again_is_not_refreshed_twice() {
    let mut f = fixture(MemoryCredentialStore::with_pair("A1", "R1")).await;

    let _stale = f
        .server
        .mock("GET", "/api/documents/")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .create_async()
        .await;
    let refresh = f
        .server
        .mock("POST", "/api/token/refresh/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A2"}"#)
        .expect(1)
        .create_async()
        .await;
    let retried = f
        .server
        .mock("GET", "/api/documents/")
        .match_header("authorization", "Bearer A2")
        .with_status(401)
        .with_body(r#"{"detail": "User is inactive"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = f.client.documents().list().await.unwrap_err();

    assert!(matches!(err, SdkError::Http(HttpError::Unauthorized(_))));
    refresh.assert_async().await;
    retried.assert_async().await;
    assert!(f.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_missing_refresh_token_redirects_without_refresh_call() {
    let store = MemoryCredentialStore::new();
    store.set_access_token("A1").unwrap();
    let mut f = fixture(store).await;

    let _stale = f
        .server
        .mock("GET", "/api/documents/")
        .with_status(401)
        .create_async()
        .await;
    let refresh = f
        .server
        .mock("POST", "/api/token/refresh/")
        .expect(0)
        .create_async()
        .await;

    let err = f.client.documents().list().await.unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::AuthInvalid));
    assert!(matches!(err, SdkError::Http(HttpError::Unauthorized(_))));
    refresh.assert_async().await;
    assert_eq!(f.navigator.routes(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_rejected_refresh_clears_credentials_and_propagates_refresh_error() {
    let mut f = fixture(MemoryCredentialStore::with_pair("A1", "R1")).await;

    let _stale = f
        .server
        .mock("GET", "/api/documents/")
        .with_status(401)
        .with_body(r#"{"detail": "access expired"}"#)
        .create_async()
        .await;
    let refresh = f
        .server
        .mock("POST", "/api/token/refresh/")
        .with_status(401)
        .with_body(r#"{"detail": "Token is blacklisted"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = f.client.documents().list().await.unwrap_err();

    match err {
        SdkError::Http(HttpError::RefreshFailed(inner)) => {
            assert!(matches!(*inner, HttpError::Unauthorized(_)));
        }
        other => panic!("expected refresh failure, got {other:?}"),
    }
    refresh.assert_async().await;
    assert!(f.store.access_token().is_none());
    assert!(f.store.refresh_token().is_none());
    assert_eq!(f.navigator.last().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let mut f = fixture(MemoryCredentialStore::with_pair("A1", "R1")).await;

    let _stale_list = f
        .server
        .mock("GET", "/api/documents/")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .create_async()
        .await;
    let _stale_detail = f
        .server
        .mock("GET", "/api/documents/5/")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .create_async()
        .await;
    let refresh = f
        .server
        .mock("POST", "/api/token/refresh/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A2"}"#)
        .expect(1)
        .create_async()
        .await;
    let _fresh_list = f
        .server
        .mock("GET", "/api/documents/")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    let _fresh_detail = f
        .server
        .mock("GET", "/api/documents/5/")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id": 5, "image": "/media/uploads/p.png", "filename": "p.png",
                "uploaded_at": "2024-05-01T10:20:30Z", "processing_status": "complete"}"#,
        )
        .create_async()
        .await;

    let documents = f.client.documents();
    let (list, detail) = tokio::join!(documents.list(), documents.get(DocumentId::new(5)));

    assert!(list.unwrap().is_empty());
    assert_eq!(detail.unwrap().id, DocumentId::new(5));
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_concurrent_401s_refresh_separately_without_single_flight() {
    let mut server = Server::new_async().await;
    let config = ClientConfig {
        base_url: server.url(),
        single_flight_refresh: false,
        ..ClientConfig::default()
    };
    let client = DigitizerClientBuilder::from_config(config)
        .unwrap()
        .credential_store(Arc::new(MemoryCredentialStore::with_pair("A1", "R1")))
        .navigator(Arc::new(RecordingNavigator::new()))
        .build()
        .unwrap();

    let _stale_list = server
        .mock("GET", "/api/documents/")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .create_async()
        .await;
    let _stale_detail = server
        .mock("GET", "/api/documents/5/")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/token/refresh/")
        .match_body(Matcher::Json(json!({"refresh": "R1"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A2"}"#)
        .expect(2)
        .create_async()
        .await;
    let fresh_list = server
        .mock("GET", "/api/documents/")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;
    let fresh_detail = server
        .mock("GET", "/api/documents/5/")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id": 5, "image": "/media/uploads/p.png", "filename": "p.png",
                "uploaded_at": "2024-05-01T10:20:30Z", "processing_status": "complete"}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let documents = client.documents();
    let (list, detail) = tokio::join!(documents.list(), documents.get(DocumentId::new(5)));

    assert!(list.unwrap().is_empty());
    assert_eq!(detail.unwrap().id, DocumentId::new(5));
    refresh.assert_async().await;
    fresh_list.assert_async().await;
    fresh_detail.assert_async().await;
}

#[tokio::test]
async fn test_logout_clears_and_navigates() {
    let f = fixture(MemoryCredentialStore::with_pair("A1", "R1")).await;

    f.client.auth().logout().unwrap();

    assert!(!f.client.auth().is_authenticated());
    assert!(f.store.credentials().is_none());
    assert_eq!(f.navigator.last().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_file_store_session_survives_new_client() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let mut server = Server::new_async().await;

    let _login = server
        .mock("POST", "/api/token/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access": "A1", "refresh": "R1"}"#)
        .create_async()
        .await;
    let list = server
        .mock("GET", "/api/documents/")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let config = ClientConfig {
        base_url: server.url(),
        credentials_file: Some(path.clone()),
        ..ClientConfig::default()
    };

    let first = DigitizerClientBuilder::from_config(config.clone())
        .unwrap()
        .build()
        .unwrap();
    first.auth().login("alice", "Secret123").await.unwrap();
    drop(first);

    let second = DigitizerClientBuilder::from_config(config)
        .unwrap()
        .build()
        .unwrap();
    assert!(second.auth().is_authenticated());
    second.documents().list().await.unwrap();
    list.assert_async().await;
}
