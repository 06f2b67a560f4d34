//! # Digitizer SDK
//!
//! Rust client for the Digitizer OCR backend: account management, document
//! uploads and extracted-text editing, with silent access-token refresh.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Shared newtypes, domain models, errors, configuration
//! 2. **Auth** — Credential storage, navigation capability, token refresh
//! 3. **HTTP API** — `DigitizerHttp` over a middleware pipeline with per-call retry policies
//! 4. **High-Level Client** — `DigitizerClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use digitizer_sdk::prelude::*;
//!
//! let client = DigitizerClient::builder()
//!     .base_url("http://localhost:8000")
//!     .build()?;
//!
//! client.auth().login("alice", "Secret123").await?;
//! let docs = client.documents().list().await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, sub-clients.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL constants and endpoint paths.
pub mod network;

/// Environment-driven client configuration.
pub mod config;

// ── Layer 2: Auth ────────────────────────────────────────────────────────────

/// Authentication: credential store, navigator, refresh, login/logout.
pub mod auth;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// HTTP pipeline, bearer decoration, auth-fault recovery, retry policies.
pub mod http;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `DigitizerClient` — the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{DocumentId, Language};

    // Domain types: document
    pub use crate::domain::document::{
        Document, DocumentUpdate, ProcessingStatus, UploadRequest,
    };

    // Errors
    pub use crate::error::{AuthError, ErrorKind, FieldErrors, HttpError, SdkError, StoreError};

    // Config + network
    pub use crate::config::ClientConfig;
    pub use crate::network::DEFAULT_API_URL;

    // Auth
    pub use crate::auth::{
        CredentialPair, CredentialStore, FileCredentialStore, MemoryCredentialStore, Navigator,
        NoopNavigator, RecordingNavigator, User,
    };

    // HTTP client + sub-clients
    pub use crate::client::{AuthClient, DigitizerClient, DigitizerClientBuilder, DocumentsClient};
    pub use crate::http::{RequestMiddleware, ResponseMiddleware, RetryConfig, RetryPolicy};
}
