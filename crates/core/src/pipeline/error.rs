//! Error types for the pipeline module.

use std::path::PathBuf;
use thiserror::Error;

use crate::converter::ConverterError;
use crate::downloader::DownloaderError;
use crate::placer::PlacerError;

/// Errors that can end a build session.
///
/// Every variant maps to exactly one terminal error event on the session's
/// live channel; the variant message is the event summary and
/// [`PipelineError::detail`] the optional detail string.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Could not create the session working directory.
    #[error("Failed to create working directory {path}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the downloader input list.
    #[error("Failed to write downloader input list")]
    ManifestWriteFailed(#[source] std::io::Error),

    /// Downloader exited with a failure code (or could not run at all).
    #[error("Download failed with exit code {exit_code}")]
    DownloadFailed {
        exit_code: i32,
        detail: Option<String>,
    },

    /// Assembly tool not installed; no process was spawned.
    #[error("Image assembly tool not found at {path}")]
    ToolMissing { path: PathBuf },

    /// Assembly tool exited with a failure code.
    #[error("Image assembly failed with exit code {exit_code}")]
    ConversionFailed {
        exit_code: i32,
        detail: Option<String>,
    },

    /// No image artifact found after a successful conversion.
    #[error("No image artifact found in working directory")]
    ArtifactNotFound,

    /// Moving the image to its published location failed.
    #[error("Failed to publish image: {reason}")]
    RelocationFailed { reason: String },

    /// Another in-flight session already publishes to the same path.
    #[error("An image build for {path} is already in progress")]
    PublishPathBusy { path: PathBuf },
}

impl PipelineError {
    /// Short summary for the terminal error event.
    pub fn summary(&self) -> String {
        self.to_string()
    }

    /// Optional detail string for the terminal error event.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::DirectoryCreateFailed { source, .. } => Some(source.to_string()),
            Self::ManifestWriteFailed(source) => Some(source.to_string()),
            Self::DownloadFailed { detail, .. } | Self::ConversionFailed { detail, .. } => {
                detail.clone()
            }
            _ => None,
        }
    }
}

impl From<DownloaderError> for PipelineError {
    fn from(err: DownloaderError) -> Self {
        match err {
            DownloaderError::Failed { exit_code, detail } => {
                Self::DownloadFailed { exit_code, detail }
            }
            DownloaderError::BinaryNotFound { path } => Self::DownloadFailed {
                exit_code: -1,
                detail: Some(format!("downloader not found at {}", path.display())),
            },
            DownloaderError::Io(e) => Self::DownloadFailed {
                exit_code: -1,
                detail: Some(e.to_string()),
            },
        }
    }
}

impl From<ConverterError> for PipelineError {
    fn from(err: ConverterError) -> Self {
        match err {
            ConverterError::ToolMissing { path } => Self::ToolMissing { path },
            ConverterError::Failed { exit_code, detail } => {
                Self::ConversionFailed { exit_code, detail }
            }
            ConverterError::Io(e) => Self::ConversionFailed {
                exit_code: -1,
                detail: Some(e.to_string()),
            },
        }
    }
}

impl From<PlacerError> for PipelineError {
    fn from(err: PlacerError) -> Self {
        match err {
            PlacerError::ArtifactNotFound { .. } => Self::ArtifactNotFound,
            other => Self::RelocationFailed {
                reason: other.to_string(),
            },
        }
    }
}
