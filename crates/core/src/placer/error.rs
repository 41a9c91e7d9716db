//! Error types for the placer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while publishing the image.
#[derive(Debug, Error)]
pub enum PlacerError {
    /// No artifact with the expected extension in the working directory.
    #[error("No image artifact found in {dir}")]
    ArtifactNotFound { dir: PathBuf },

    /// Artifact name would escape the publish root.
    #[error("Invalid artifact name: {name}")]
    InvalidArtifactName { name: String },

    /// Failed to create the destination directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move the artifact into place.
    #[error("Failed to move artifact from {source} to {destination}")]
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlacerError {
    /// Creates a move failed error.
    pub fn move_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::MoveFailed {
            source,
            destination,
            error,
        }
    }
}
