//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during image assembly.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Assembly tool not installed at its configured path. Raised before
    /// any process is spawned.
    #[error("Image assembly tool not found at path: {path}")]
    ToolMissing { path: PathBuf },

    /// Assembly process exited with a failure code.
    #[error("Image assembly failed with exit code {exit_code}")]
    Failed {
        exit_code: i32,
        detail: Option<String>,
    },

    /// I/O error while driving the tool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a failed error with optional diagnostic output.
    pub fn failed(exit_code: i32, detail: Option<String>) -> Self {
        Self::Failed { exit_code, detail }
    }
}
