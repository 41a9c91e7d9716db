//! Trait definitions for the placer module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::progress::ProgressBus;

use super::error::PlacerError;
use super::types::PlacedArtifact;

/// A placer that can publish a session's finished image.
#[async_trait]
pub trait Placer: Send + Sync {
    /// Returns the name of this placer implementation.
    fn name(&self) -> &str;

    /// Final filename for an artifact base name (extension applied).
    fn artifact_filename(&self, artifact_name: &str) -> String;

    /// Final published path for an artifact base name. Stable for the whole
    /// session; used up front to detect publish collisions.
    fn destination_for(&self, artifact_name: &str) -> PathBuf;

    /// Locates the finished image in the working directory and moves it to
    /// its published location, reporting progress through the session bus.
    async fn publish(
        &self,
        work_dir: &Path,
        artifact_name: &str,
        events: &ProgressBus,
    ) -> Result<PlacedArtifact, PlacerError>;
}
