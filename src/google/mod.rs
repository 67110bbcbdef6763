//! Google Sheets v4 / Drive v3 access.
//!
//! This module provides:
//! - The API traits the workflows are written against
//! - Serde wire types for batch requests, values and Drive files
//! - A1 notation helpers
//! - The reqwest-based HTTP client

pub mod a1;
pub mod api;
pub mod http_client;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use api::{DriveApi, SheetsApi};
pub use http_client::HttpGoogleClient;
pub use types::*;
