//! Error types for the downloader module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching manifest files.
#[derive(Debug, Error)]
pub enum DownloaderError {
    /// Downloader binary not found.
    #[error("Downloader not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// Downloader process exited with a failure code.
    #[error("Download failed with exit code {exit_code}")]
    Failed {
        exit_code: i32,
        detail: Option<String>,
    },

    /// I/O error while driving the downloader.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloaderError {
    /// Creates a failed error with optional diagnostic output.
    pub fn failed(exit_code: i32, detail: Option<String>) -> Self {
        Self::Failed { exit_code, detail }
    }
}
