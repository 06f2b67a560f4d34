//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Validated domain types
//! - `wire.rs` — Raw serde structs matching backend responses
//! - `convert.rs` — `TryFrom` conversions with validation
//! - `client.rs` — Sub-client with HTTP methods

pub mod document;
