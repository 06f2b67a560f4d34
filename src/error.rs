//! Unified SDK error types.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl SdkError {
    /// Error classification, if this error came from the HTTP layer.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SdkError::Http(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Timeout")]
    Timeout,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation failed ({status}): {errors}")]
    Validation { status: u16, errors: FieldErrors },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(Box<HttpError>),

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Caller-facing classification of an [`HttpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure, no response.
    Network,
    /// 401 with no way to recover, or the refresh itself was rejected.
    AuthInvalid,
    /// 4xx with structured field errors from the backend.
    Validation,
    NotFound,
    RateLimited,
    Server,
    Decode,
}

impl HttpError {
    /// Map a non-success status and its body to an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => HttpError::Unauthorized(body.to_string()),
            404 => HttpError::NotFound(FieldErrors::parse(body).message_or(body)),
            429 => HttpError::RateLimited {
                retry_after_ms: None,
            },
            400..=499 => HttpError::Validation {
                status,
                errors: FieldErrors::parse(body),
            },
            _ => HttpError::ServerError {
                status,
                body: body.to_string(),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::Reqwest(e) if e.is_decode() => ErrorKind::Decode,
            HttpError::Reqwest(_) | HttpError::Timeout => ErrorKind::Network,
            HttpError::Unauthorized(_) | HttpError::RefreshFailed(_) => ErrorKind::AuthInvalid,
            HttpError::Validation { .. } => ErrorKind::Validation,
            HttpError::NotFound(_) => ErrorKind::NotFound,
            HttpError::RateLimited { .. } => ErrorKind::RateLimited,
            HttpError::ServerError { .. } | HttpError::MaxRetriesExceeded { .. } => {
                ErrorKind::Server
            }
            HttpError::Decode(_) => ErrorKind::Decode,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HttpError::Unauthorized(_))
    }
}

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Token expired")]
    TokenExpired,
}

/// Credential store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt credential file: {0}")]
    Serde(#[from] serde_json::Error),
}

// ============================================================================
// Field errors
// ============================================================================

/// Structured field errors returned by the backend on 4xx responses.
///
/// The backend sends either `{"field": ["msg", ...]}` or `{"field": "msg"}`.
/// Bodies that are not JSON objects end up under the `"error"` key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
    Other(serde_json::Value),
}

impl FieldErrors {
    pub const GENERAL_KEY: &'static str = "error";

    pub fn parse(body: &str) -> Self {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Self::default();
        }

        match serde_json::from_str::<BTreeMap<String, OneOrMany>>(trimmed) {
            Ok(map) => Self(
                map.into_iter()
                    .map(|(field, value)| {
                        let messages = match value {
                            OneOrMany::One(s) => vec![s],
                            OneOrMany::Many(v) => v,
                            OneOrMany::Other(v) => vec![v.to_string()],
                        };
                        (field, messages)
                    })
                    .collect(),
            ),
            Err(_) => {
                let mut map = BTreeMap::new();
                map.insert(Self::GENERAL_KEY.to_string(), vec![trimmed.to_string()]);
                Self(map)
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Messages under the general `"error"` key.
    pub fn general(&self) -> Option<&[String]> {
        self.get(Self::GENERAL_KEY)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn message_or(&self, fallback: &str) -> String {
        self.general()
            .and_then(|msgs| msgs.first())
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, msgs)| format!("{}: {}", field, msgs.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
