//! HTTP client layer — middleware pipeline, bearer auth, silent token refresh,
//! retry policies.

pub mod bearer;
pub mod client;
pub mod fault;
pub mod middleware;
pub mod request;
pub mod retry;
pub mod transport;

pub use bearer::BearerDecorator;
pub use client::DigitizerHttp;
pub use fault::AuthFaultHandler;
pub use middleware::{
    Dispatched, Outcome, Pipeline, Redispatch, RequestMiddleware, ResponseMiddleware,
};
pub use request::{AuthMode, FormPart, InboundResponse, OutboundRequest, RequestBody};
pub use retry::{RetryConfig, RetryPolicy};
pub use transport::{ReqwestTransport, Transport};
