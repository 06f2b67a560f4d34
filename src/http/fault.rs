//! Response fault handler — silent re-authentication on 401.
//!
//! ```text
//! NORMAL ──401, first attempt──▶ ON_AUTH_FAILURE
//!                                   │ no refresh token ──▶ REDIRECTING (original error)
//!                                   ▼
//!                               REFRESHING
//!                                   │ failure ──▶ REDIRECTING (refresh error, credentials cleared)
//!                                   ▼
//!                               RETRYING ──▶ whatever the retry yields
//! ```
//!
//! The retry flag is stamped before the refresh starts, so a request is
//! refreshed at most once even if its retry also comes back 401. Concurrent
//! refreshes are serialized inside [`TokenRefresher::refresh_stale`].

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::auth::{Navigator, RefreshOutcome, TokenRefresher};
use crate::error::HttpError;
use crate::http::middleware::{Outcome, Redispatch, ResponseMiddleware};
use crate::http::request::OutboundRequest;

pub struct AuthFaultHandler {
    refresher: Arc<TokenRefresher>,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl AuthFaultHandler {
    pub fn new(
        refresher: Arc<TokenRefresher>,
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            refresher,
            navigator,
            login_route: login_route.into(),
        }
    }

    fn redirect(&self) {
        tracing::warn!(route = %self.login_route, "Redirecting to login");
        self.navigator.navigate(&self.login_route);
    }

    async fn recover(
        &self,
        mut request: OutboundRequest,
        original: HttpError,
        redispatch: &Redispatch<'_>,
    ) -> Outcome {
        request.retry = true;

        let stale = request.bearer_token().map(str::to_string);
        match self.refresher.refresh_stale(stale.as_deref()).await {
            None => {
                tracing::warn!(url = %request.url, "401 with no refresh token stored");
                self.redirect();
                Err(original)
            }
            Some(RefreshOutcome::Success(access)) => {
                self.retry(request, &access, redispatch).await
            }
            Some(RefreshOutcome::Failure(e)) => {
                self.redirect();
                Err(HttpError::RefreshFailed(Box::new(e)))
            }
        }
    }

    async fn retry(
        &self,
        mut request: OutboundRequest,
        token: &str,
        redispatch: &Redispatch<'_>,
    ) -> Outcome {
        if !request.set_bearer(token) {
            tracing::warn!(url = %request.url, "Refreshed access token is not a valid header value");
        }
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            "Retrying request with refreshed token"
        );
        redispatch.send(request).await
    }
}

impl ResponseMiddleware for AuthFaultHandler {
    fn on_response<'a>(
        &'a self,
        request: OutboundRequest,
        outcome: Outcome,
        redispatch: &'a Redispatch<'a>,
    ) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            match outcome {
                Err(e) if e.is_unauthorized() && !request.retry && !request.is_anonymous() => {
                    tracing::warn!(url = %request.url, "Received 401, attempting token refresh");
                    self.recover(request, e, redispatch).await
                }
                other => other,
            }
        })
    }
}
