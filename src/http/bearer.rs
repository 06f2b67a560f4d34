//! Request decorator — attaches the stored access token.

use std::sync::Arc;

use crate::auth::CredentialStore;
use crate::http::middleware::RequestMiddleware;
use crate::http::request::OutboundRequest;

/// Sets `Authorization: Bearer <access>` on every bearer request when a token
/// is stored. Leaves the request untouched otherwise.
///
/// A retry that already carries a token keeps it: the refresh that stamped it
/// may not have reached the store.
pub struct BearerDecorator {
    store: Arc<dyn CredentialStore>,
}

impl BearerDecorator {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

impl RequestMiddleware for BearerDecorator {
    fn on_request(&self, mut request: OutboundRequest) -> OutboundRequest {
        if request.is_anonymous() || (request.retry && request.bearer_token().is_some()) {
            return request;
        }
        if let Some(token) = self.store.access_token() {
            if !request.set_bearer(&token) {
                tracing::warn!(url = %request.url, "Stored access token is not a valid header value");
            }
        }
        request
    }
}
