//! Token refresh — exchanges the stored refresh token for a new access token.
//!
//! Both the 401 fault handler and proactive session checks go through
//! [`TokenRefresher::refresh_stale`], so with single-flight on they share one
//! lock and one in-flight exchange.

use std::sync::Arc;

use async_lock::Mutex;

use crate::auth::{CredentialStore, RefreshOutcome, RefreshRequest, RefreshResponse};
use crate::error::HttpError;
use crate::http::request::OutboundRequest;
use crate::http::transport::Transport;

/// Performs `POST /api/token/refresh/` directly on the transport, bypassing
/// every middleware layer. The request carries only the refresh token.
pub struct TokenRefresher {
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    refresh_url: String,
    /// Serializes refreshes when single-flight is on.
    lock: Option<Mutex<()>>,
}

impl TokenRefresher {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        refresh_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            store,
            refresh_url: refresh_url.into(),
            lock: Some(Mutex::new(())),
        }
    }

    /// Serialize concurrent refreshes (default: on). When off, every caller
    /// performs its own exchange.
    pub fn single_flight(mut self, enabled: bool) -> Self {
        self.lock = enabled.then(|| Mutex::new(()));
        self
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Replace `stale`, the access token a caller found unusable.
    ///
    /// Returns `None` when no refresh token is stored. With single-flight on,
    /// a caller whose `stale` token was already replaced while it waited gets
    /// the current token back without a second exchange. A rejected exchange
    /// clears both credentials before the lock is released.
    pub async fn refresh_stale(&self, stale: Option<&str>) -> Option<RefreshOutcome> {
        let _guard = match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let refresh_token = self.store.refresh_token()?;
        if self.lock.is_some() {
            if let Some(current) = self.store.access_token() {
                if stale != Some(current.as_str()) {
                    tracing::debug!("Access token already refreshed by another caller");
                    return Some(RefreshOutcome::Success(current));
                }
            }
        }

        let outcome = self.refresh(&refresh_token).await;
        if matches!(outcome, RefreshOutcome::Failure(_)) {
            if let Err(e) = self.store.clear() {
                tracing::error!(error = %e, "Failed to clear credentials");
            }
        }
        Some(outcome)
    }

    /// Refresh with `refresh_token` and persist the result.
    ///
    /// On success the new access token (and a rotated refresh token, if the
    /// backend sent one) is written to the store. A store write failure is
    /// logged; the fresh token is still returned.
    pub async fn refresh(&self, refresh_token: &str) -> RefreshOutcome {
        tracing::info!("Refreshing access token...");

        let response = match self.exchange(refresh_token).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                return RefreshOutcome::Failure(e);
            }
        };

        if let Err(e) = self.store.set_access_token(&response.access) {
            tracing::error!(error = %e, "Failed to persist refreshed access token");
        }
        if let Some(rotated) = response.refresh.as_deref().filter(|r| !r.is_empty()) {
            if let Err(e) = self.store.set(crate::auth::REFRESH_TOKEN_KEY, rotated) {
                tracing::error!(error = %e, "Failed to persist rotated refresh token");
            }
        }

        tracing::info!(rotated = response.refresh.is_some(), "Access token refreshed");
        RefreshOutcome::Success(response.access)
    }

    async fn exchange(&self, refresh_token: &str) -> Result<RefreshResponse, HttpError> {
        let body = serde_json::to_value(RefreshRequest {
            refresh: refresh_token.to_string(),
        })
        .map_err(|e| HttpError::Decode(e.to_string()))?;
        let request = OutboundRequest::post(&self.refresh_url).json(body).anonymous();

        let response = self.transport.send(&request).await?.error_for_status()?;
        let data: RefreshResponse = response.json()?;

        if data.access.is_empty() {
            return Err(HttpError::Decode(
                "refresh response does not contain an access token".to_string(),
            ));
        }
        Ok(data)
    }
}
