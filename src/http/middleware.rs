//! Middleware pipeline — ordered request and response transforms around a transport.
//!
//! Request layers run in insertion order before the transport. The transport's
//! non-success statuses are turned into errors, then response layers run in
//! insertion order. A response layer may re-dispatch the request through the
//! whole pipeline via [`Redispatch`] (this is how the auth-fault handler
//! retries). The re-dispatched run applies every response layer to its own
//! outcome, so the outer run stops at the layer that re-dispatched.

use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;

use crate::error::HttpError;
use crate::http::request::{InboundResponse, OutboundRequest};
use crate::http::transport::Transport;

/// What a response layer receives and returns.
pub type Outcome = Result<InboundResponse, HttpError>;

/// `(request) -> request`.
pub trait RequestMiddleware: Send + Sync {
    fn on_request(&self, request: OutboundRequest) -> OutboundRequest;
}

/// `(response | error) -> response | error`.
pub trait ResponseMiddleware: Send + Sync {
    fn on_response<'a>(
        &'a self,
        request: OutboundRequest,
        outcome: Outcome,
        redispatch: &'a Redispatch<'a>,
    ) -> BoxFuture<'a, Outcome>;
}

/// The last request that reached the transport, with its final outcome.
#[derive(Debug)]
pub struct Dispatched {
    pub request: OutboundRequest,
    pub outcome: Outcome,
}

/// Handle a response layer uses to send a request through the pipeline again.
pub struct Redispatch<'a> {
    pipeline: &'a Pipeline,
    sent: Mutex<Option<OutboundRequest>>,
}

impl<'a> Redispatch<'a> {
    fn new(pipeline: &'a Pipeline) -> Self {
        Self {
            pipeline,
            sent: Mutex::new(None),
        }
    }

    /// Run `request` through every layer and the transport.
    pub async fn send(&self, request: OutboundRequest) -> Outcome {
        let dispatched = self.pipeline.dispatch(request).await;
        *self
            .sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(dispatched.request);
        dispatched.outcome
    }

    fn into_sent(self) -> Option<OutboundRequest> {
        self.sent
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct Pipeline {
    transport: Arc<dyn Transport>,
    request_layers: Vec<Arc<dyn RequestMiddleware>>,
    response_layers: Vec<Arc<dyn ResponseMiddleware>>,
}

impl Pipeline {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            request_layers: Vec::new(),
            response_layers: Vec::new(),
        }
    }

    pub fn with_request_layer(mut self, layer: Arc<dyn RequestMiddleware>) -> Self {
        self.request_layers.push(layer);
        self
    }

    pub fn with_response_layer(mut self, layer: Arc<dyn ResponseMiddleware>) -> Self {
        self.response_layers.push(layer);
        self
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Run a request through every layer and the transport.
    pub async fn execute(&self, request: OutboundRequest) -> Outcome {
        self.dispatch(request).await.outcome
    }

    /// Like [`execute`](Self::execute), but also returns the request as last
    /// sent, including any retry stamping a response layer applied.
    pub fn dispatch(&self, request: OutboundRequest) -> BoxFuture<'_, Dispatched> {
        Box::pin(async move {
            let request = self
                .request_layers
                .iter()
                .fold(request, |req, layer| layer.on_request(req));

            let mut outcome = self
                .transport
                .send(&request)
                .await
                .and_then(InboundResponse::error_for_status);

            for layer in &self.response_layers {
                let redispatch = Redispatch::new(self);
                outcome = layer
                    .on_response(request.clone(), outcome, &redispatch)
                    .await;
                if let Some(sent) = redispatch.into_sent() {
                    return Dispatched {
                        request: sent,
                        outcome,
                    };
                }
            }
            Dispatched { request, outcome }
        })
    }
}
