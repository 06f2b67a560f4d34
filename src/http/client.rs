//! Low-level HTTP client — `DigitizerHttp`.
//!
//! Every call goes through the middleware [`Pipeline`] (bearer decorator,
//! auth-fault handler, any user layers) and then the per-call retry policy.
//! Returns wire types; sub-clients convert them to domain types.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::HttpError;
use crate::http::middleware::Pipeline;
use crate::http::request::{FormPart, InboundResponse, OutboundRequest};
use crate::http::retry::RetryPolicy;

/// Low-level HTTP client for the Digitizer REST API.
#[derive(Clone)]
pub struct DigitizerHttp {
    base_url: String,
    pipeline: Arc<Pipeline>,
}

impl DigitizerHttp {
    pub fn new(base_url: &str, pipeline: Arc<Pipeline>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            pipeline,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── Typed helpers ────────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let request = OutboundRequest::get(self.url(path));
        self.send(request, retry).await?.json()
    }

    /// POST without bearer auth or refresh handling (login, register).
    pub(crate) async fn post_anonymous<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HttpError> {
        let request = OutboundRequest::post(self.url(path))
            .json(to_json(body)?)
            .anonymous();
        self.send(request, RetryPolicy::None).await?.json()
    }

    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HttpError> {
        let request = OutboundRequest::new(Method::PATCH, self.url(path)).json(to_json(body)?);
        self.send(request, RetryPolicy::None).await?.json()
    }

    /// DELETE; the backend answers 204 with no body.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), HttpError> {
        let request = OutboundRequest::new(Method::DELETE, self.url(path));
        self.send(request, RetryPolicy::None).await?;
        Ok(())
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<T, HttpError> {
        let request = OutboundRequest::post(self.url(path)).multipart(parts);
        self.send(request, RetryPolicy::None).await?.json()
    }

    // ── Dispatch ─────────────────────────────────────────────────────────

    /// Send an arbitrary request through the pipeline with a retry policy.
    pub async fn send(
        &self,
        request: OutboundRequest,
        retry: RetryPolicy,
    ) -> Result<InboundResponse, HttpError> {
        let Some(config) = retry.config() else {
            return self.pipeline.execute(request).await;
        };

        let mut last_error = None;
        let mut current = request;

        for attempt in 0..=config.max_retries {
            let dispatched = self.pipeline.dispatch(current).await;
            // A refreshed request stays refreshed on later attempts.
            current = dispatched.request;
            match dispatched.outcome {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if !config.should_retry(&e) {
                        return Err(e);
                    }
                    if attempt >= config.max_retries {
                        last_error = Some(e);
                        break;
                    }

                    let delay = config.delay_for(&e, attempt);
                    tracing::debug!(
                        attempt = attempt + 1,
                        max = config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying request to {}",
                        current.url
                    );
                    futures_timer::Delay::new(delay).await;
                    last_error = Some(e);
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

impl std::fmt::Debug for DigitizerHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitizerHttp")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn to_json<B: Serialize>(body: &B) -> Result<serde_json::Value, HttpError> {
    serde_json::to_value(body).map_err(|e| HttpError::Decode(e.to_string()))
}
