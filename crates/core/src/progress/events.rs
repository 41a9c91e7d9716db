//! Wire event types pushed to the session subscriber.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The ordered phases a build session passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Session setup: working directory and downloader input list.
    Init,
    /// Update files are being fetched by the external downloader.
    Download,
    /// The assembly tool is building the disk image.
    Convert,
    /// The finished image is being relocated to the publish root.
    Move,
    /// Terminal success.
    Complete,
}

impl Stage {
    /// Lowercase name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Download => "download",
            Stage::Convert => "convert",
            Stage::Move => "move",
            Stage::Complete => "complete",
        }
    }
}

/// Event sent to the session's subscriber channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireEvent {
    /// Stage progress update.
    Progress {
        stage: Stage,
        message: String,
        /// Percentage in `[0, 100]`, never decreasing within a session.
        progress: f32,
    },
    /// Terminal success event carrying the published artifact location.
    Complete {
        message: String,
        filename: String,
        path: PathBuf,
    },
    /// Terminal error event.
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}
