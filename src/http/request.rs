//! Request/response model shared by the pipeline, its layers and the transport.
//!
//! Bodies are owned and cloneable so a request can be re-dispatched after a
//! token refresh. Responses are fully buffered.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// Whether a request participates in bearer authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Decorated with the stored access token; 401s go through the refresh flow.
    #[default]
    Bearer,
    /// Sent as-is and never refreshed (login, register, refresh itself).
    Anonymous,
}

/// One part of a multipart form.
#[derive(Debug, Clone)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: String,
        bytes: Bytes,
    },
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// An outbound request as seen by middleware.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
    /// Set once the request has been through a refresh; never retried again.
    pub retry: bool,
    pub auth: AuthMode,
}

impl OutboundRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            retry: false,
            auth: AuthMode::Bearer,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.auth = AuthMode::Anonymous;
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.auth == AuthMode::Anonymous
    }

    /// Set `Authorization: Bearer <token>`. Returns false if the token is not a
    /// valid header value.
    pub fn set_bearer(&mut self, token: &str) -> bool {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(AUTHORIZATION, value);
                true
            }
            Err(_) => false,
        }
    }

    /// The token currently carried in the Authorization header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }
}

/// A buffered response.
#[derive(Debug, Clone)]
pub struct InboundResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InboundResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_slice(&self.body).map_err(|e| HttpError::Decode(e.to_string()))
    }

    /// Non-success statuses become errors.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.status.is_success() {
            return Ok(self);
        }
        let mut err = HttpError::from_status(self.status.as_u16(), &self.text());
        if let HttpError::RateLimited { retry_after_ms } = &mut err {
            *retry_after_ms = self
                .headers
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000));
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> InboundResponse {
        InboundResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_bearer_round_trip() {
        let mut req = OutboundRequest::get("http://localhost/api/documents/");
        assert!(req.bearer_token().is_none());
        assert!(req.set_bearer("A1"));
        assert_eq!(req.headers.get(AUTHORIZATION).unwrap(), "Bearer A1");
        assert_eq!(req.bearer_token(), Some("A1"));
    }

    #[test]
    fn test_set_bearer_rejects_invalid_header() {
        let mut req = OutboundRequest::get("http://localhost/");
        assert!(!req.set_bearer("bad\ntoken"));
        assert!(req.bearer_token().is_none());
    }

    #[test]
    fn test_error_for_status() {
        assert!(response(204, "").error_for_status().is_ok());
        assert!(response(401, "{}")
            .error_for_status()
            .unwrap_err()
            .is_unauthorized());
    }

    #[test]
    fn test_rate_limit_reads_retry_after() {
        let mut resp = response(429, "");
        resp.headers
            .insert(reqwest::header::RETRY_AFTER, HeaderValue::from_static("2"));
        match resp.error_for_status() {
            Err(HttpError::RateLimited { retry_after_ms }) => {
                assert_eq!(retry_after_ms, Some(2000))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_huge_retry_after_saturates() {
        let mut resp = response(429, "");
        resp.headers.insert(
            reqwest::header::RETRY_AFTER,
            HeaderValue::from_static("99999999999999999"),
        );
        match resp.error_for_status() {
            Err(HttpError::RateLimited { retry_after_ms }) => {
                assert_eq!(retry_after_ms, Some(u64::MAX))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
