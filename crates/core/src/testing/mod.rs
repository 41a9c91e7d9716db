//! Testing utilities and mock implementations for integration tests.
//!
//! This module provides mock implementations of the pipeline driver traits,
//! allowing full session lifecycle testing without aria2 or the assembly
//! tool installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use isoforge_core::testing::{MockConverter, MockDownloader};
//!
//! let downloader = MockDownloader::new();
//! let converter = MockConverter::new();
//!
//! // Configure mock behavior
//! downloader.set_progress_script(vec![25, 50, 100]).await;
//! converter.set_next_error(ConverterError::failed(2, None)).await;
//! ```

mod mock_converter;
mod mock_downloader;
mod mock_placer;

pub use mock_converter::MockConverter;
pub use mock_downloader::MockDownloader;
pub use mock_placer::MockPlacer;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{FileSource, UpdateManifest};
    use std::collections::BTreeMap;

    /// Create a manifest with the given (name, url) pairs and dummy hashes.
    pub fn manifest(update_name: &str, entries: &[(&str, Option<&str>)]) -> UpdateManifest {
        let files: BTreeMap<String, FileSource> = entries
            .iter()
            .enumerate()
            .map(|(i, (name, url))| {
                (
                    name.to_string(),
                    FileSource {
                        url: url.map(str::to_string),
                        sha1: format!("{:040x}", i + 1),
                        size: Some(1024 * (i as u64 + 1)),
                    },
                )
            })
            .collect();

        UpdateManifest {
            update_name: update_name.to_string(),
            files,
        }
    }

    /// Create a two-file manifest with valid source URLs.
    pub fn valid_manifest(update_name: &str) -> UpdateManifest {
        manifest(
            update_name,
            &[
                ("core1.esd", Some("https://cdn.example.com/core1.esd")),
                ("metadata.cab", Some("https://cdn.example.com/metadata.cab")),
            ],
        )
    }
}

/// Installs a `tracing` subscriber printing to the test output. Safe to call
/// from every test; only the first call wins.
pub fn init_test_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
