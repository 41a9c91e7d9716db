//! Types for the placer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A successfully published image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedArtifact {
    /// Final filename under the publish root.
    pub filename: String,
    /// Full published path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size_bytes: u64,
}
