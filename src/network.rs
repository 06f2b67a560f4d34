//! Network URL constants and endpoint paths for the Digitizer API.

/// Default REST API base URL (local development backend).
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Route the navigator is sent to when the session cannot be recovered.
pub const LOGIN_ROUTE: &str = "/login";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const TOKEN_PATH: &str = "/api/token/";
pub const TOKEN_REFRESH_PATH: &str = "/api/token/refresh/";
pub const REGISTER_PATH: &str = "/api/user/register/";
pub const DOCUMENTS_PATH: &str = "/api/documents/";
pub const UPLOAD_PATH: &str = "/api/upload/";

/// Path of a single document: `/api/documents/:id/`.
pub fn document_path(id: u64) -> String {
    format!("{}{}/", DOCUMENTS_PATH, id)
}
