//! Authentication — credential storage, navigation capability, token refresh,
//! login/register/logout.
//!
//! ## Token model
//!
//! - The backend issues a short-lived **access** token and a longer-lived
//!   **refresh** token (`POST /api/token/`).
//! - Both live in an injected [`CredentialStore`] under the fixed keys
//!   [`ACCESS_TOKEN_KEY`] and [`REFRESH_TOKEN_KEY`]. The SDK never reaches for
//!   ambient global storage.
//! - When a bearer request comes back 401 the HTTP layer refreshes the access
//!   token once and retries (see [`crate::http::fault`]). When that is not
//!   possible the credentials are cleared and the injected [`Navigator`] is sent
//!   to the login route.

pub mod client;
pub mod jwt;
pub mod navigator;
pub mod refresh;
pub mod store;

pub use navigator::{Navigator, NoopNavigator, RecordingNavigator};
pub use refresh::TokenRefresher;
pub use store::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};

use serde::{Deserialize, Serialize};

use crate::error::HttpError;

// ============================================================================
// Credential types
// ============================================================================

/// Access + refresh token pair as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a single refresh attempt.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The new access token.
    Success(String),
    Failure(HttpError),
}

/// Account as returned by the register endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

// ============================================================================
// Wire types
// ============================================================================

/// `POST /api/token/` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /api/token/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
}

impl From<TokenResponse> for CredentialPair {
    fn from(t: TokenResponse) -> Self {
        Self {
            access_token: t.access,
            refresh_token: t.refresh,
        }
    }
}

/// `POST /api/token/refresh/` body. Carries nothing but the refresh token.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// `POST /api/token/refresh/` response. `refresh` is present when the backend
/// rotates refresh tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// `POST /api/user/register/` body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_into_pair() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"access": "A1", "refresh": "R1"}"#).unwrap();
        let pair: CredentialPair = resp.into();
        assert_eq!(pair.access_token, "A1");
        assert_eq!(pair.refresh_token, "R1");
    }

    #[test]
    fn test_refresh_response_optional_rotation() {
        let resp: RefreshResponse = serde_json::from_str(r#"{"access": "A2"}"#).unwrap();
        assert_eq!(resp.access, "A2");
        assert!(resp.refresh.is_none());

        let rotated: RefreshResponse =
            serde_json::from_str(r#"{"access": "A2", "refresh": "R2"}"#).unwrap();
        assert_eq!(rotated.refresh.as_deref(), Some("R2"));
    }

    #[test]
    fn test_user_deserialize_without_password() {
        let user: User =
            serde_json::from_str(r#"{"id": 3, "username": "alice", "email": "a@x.io"}"#)
                .unwrap();
        assert_eq!(user.username, "alice");
    }
}
