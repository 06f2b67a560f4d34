//! Transport — the last stage of the pipeline, performs the actual HTTP call.

use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::error::HttpError;
use crate::http::request::{FormPart, InboundResponse, OutboundRequest, RequestBody};

/// Sends a request and buffers the response. Any status is `Ok`; only
/// transport failures are `Err`.
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: &'a OutboundRequest,
    ) -> BoxFuture<'a, Result<InboundResponse, HttpError>>;
}

/// `reqwest`-backed transport with connection pooling.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn execute(&self, request: &OutboundRequest) -> Result<InboundResponse, HttpError> {
        let mut req = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());

        req = match &request.body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(value),
            RequestBody::Multipart(parts) => req.multipart(build_form(parts)?),
        };

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            retry = request.retry,
            "Sending HTTP request"
        );

        let resp = req.send().await.map_err(map_transport_error)?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(map_transport_error)?;

        tracing::debug!(
            status = status.as_u16(),
            url = %request.url,
            "Received HTTP response"
        );

        Ok(InboundResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: &'a OutboundRequest,
    ) -> BoxFuture<'a, Result<InboundResponse, HttpError>> {
        Box::pin(self.execute(request))
    }
}

fn map_transport_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::Reqwest(e)
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, HttpError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let file = Part::bytes(bytes.to_vec())
                    .file_name(file_name.clone())
                    .mime_str(mime)?;
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}
