//! High-level client — `DigitizerClient` with nested sub-client accessors.
//!
//! The builder wires the pipeline in a fixed order: the bearer decorator first,
//! then any user request layers; the auth-fault handler first among response
//! layers, then any user response layers.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::client::Auth;
use crate::auth::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, Navigator, NoopNavigator,
    TokenRefresher,
};
use crate::config::ClientConfig;
use crate::domain::document::client::Documents;
use crate::error::SdkError;
use crate::http::{
    AuthFaultHandler, BearerDecorator, DigitizerHttp, Pipeline, RequestMiddleware,
    ReqwestTransport, ResponseMiddleware, Transport,
};
use crate::network::TOKEN_REFRESH_PATH;

// Re-export sub-client types for convenience.
pub use crate::auth::client::Auth as AuthClient;
pub use crate::domain::document::client::Documents as DocumentsClient;

/// The primary entry point for the Digitizer SDK.
///
/// `client.auth()` for login/register/logout, `client.documents()` for
/// document CRUD and uploads.
#[derive(Clone)]
pub struct DigitizerClient {
    pub(crate) http: DigitizerHttp,
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) refresher: Arc<TokenRefresher>,
    pub(crate) login_route: String,
}

impl DigitizerClient {
    pub fn builder() -> DigitizerClientBuilder {
        DigitizerClientBuilder::default()
    }

    /// Build a client from `DIGITIZER_*` environment variables.
    pub fn from_env() -> Result<Self, SdkError> {
        DigitizerClientBuilder::from_config(ClientConfig::from_env()?)?.build()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }

    pub fn documents(&self) -> Documents<'_> {
        Documents { client: self }
    }

    /// Low-level HTTP access for endpoints without a sub-client.
    pub fn http(&self) -> &DigitizerHttp {
        &self.http
    }

    pub fn credential_store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }
}

impl std::fmt::Debug for DigitizerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitizerClient")
            .field("http", &self.http)
            .field("login_route", &self.login_route)
            .finish_non_exhaustive()
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct DigitizerClientBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn CredentialStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    transport: Option<Arc<dyn Transport>>,
    request_layers: Vec<Arc<dyn RequestMiddleware>>,
    response_layers: Vec<Arc<dyn ResponseMiddleware>>,
}

impl Default for DigitizerClientBuilder {
    fn default() -> Self {
        Self {
            config: ClientConfig::default(),
            store: None,
            navigator: None,
            transport: None,
            request_layers: Vec::new(),
            response_layers: Vec::new(),
        }
    }
}

impl DigitizerClientBuilder {
    /// Start from a config. Opens the credential file when one is configured.
    pub fn from_config(config: ClientConfig) -> Result<Self, SdkError> {
        let store = match &config.credentials_file {
            Some(path) => {
                let file: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::open(path)?);
                Some(file)
            }
            None => None,
        };
        Ok(Self {
            config,
            store,
            ..Self::default()
        })
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.base_url = url.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn login_route(mut self, route: &str) -> Self {
        self.config.login_route = route.to_string();
        self
    }

    /// Serialize concurrent refreshes (default: on).
    pub fn single_flight_refresh(mut self, enabled: bool) -> Self {
        self.config.single_flight_refresh = enabled;
        self
    }

    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Replace the reqwest transport (e.g. a preconfigured `reqwest::Client`).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Append a request layer; runs after the bearer decorator.
    pub fn request_layer(mut self, layer: Arc<dyn RequestMiddleware>) -> Self {
        self.request_layers.push(layer);
        self
    }

    /// Append a response layer; runs after the auth-fault handler.
    pub fn response_layer(mut self, layer: Arc<dyn ResponseMiddleware>) -> Self {
        self.response_layers.push(layer);
        self
    }

    pub fn build(self) -> Result<DigitizerClient, SdkError> {
        let config = self.config;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator));
        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(config.timeout)?),
        };

        let refresher = Arc::new(
            TokenRefresher::new(
                transport.clone(),
                store.clone(),
                format!("{}{}", base_url, TOKEN_REFRESH_PATH),
            )
            .single_flight(config.single_flight_refresh),
        );

        let mut pipeline = Pipeline::new(transport)
            .with_request_layer(Arc::new(BearerDecorator::new(store.clone())))
            .with_response_layer(Arc::new(AuthFaultHandler::new(
                refresher.clone(),
                navigator.clone(),
                config.login_route.clone(),
            )));
        for layer in self.request_layers {
            pipeline = pipeline.with_request_layer(layer);
        }
        for layer in self.response_layers {
            pipeline = pipeline.with_response_layer(layer);
        }

        tracing::debug!(
            base_url = %base_url,
            single_flight = config.single_flight_refresh,
            "Built Digitizer client"
        );

        Ok(DigitizerClient {
            http: DigitizerHttp::new(&base_url, Arc::new(pipeline)),
            store,
            navigator,
            refresher,
            login_route: config.login_route,
        })
    }
}
