//! Remote update catalog integration.
//!
//! This module provides the client used to resolve a packaged-update
//! identifier plus language and edition into a concrete file manifest
//! (filename -> source URL + checksum) before a build session starts.
//! Catalog browsing and search live behind other services and are not part
//! of this crate.

mod client;
mod types;

pub use client::{CatalogClient, CatalogConfig};
pub use types::{FileSource, UpdateManifest};

use thiserror::Error;

/// Default language requested when the caller does not specify one.
pub const DEFAULT_LANGUAGE: &str = "en-us";

/// Default edition requested when the caller does not specify one.
pub const DEFAULT_EDITION: &str = "Professional";

/// Errors that can occur when talking to the update catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Catalog returned an error status.
    #[error("Catalog error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse the catalog response.
    #[error("Failed to parse catalog response: {0}")]
    ParseError(String),

    /// Catalog answered without any download data for the request.
    #[error("Catalog returned no download data for the requested update")]
    EmptyResponse,
}
