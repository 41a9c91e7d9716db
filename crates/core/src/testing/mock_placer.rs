//! Mock placer for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::placer::{PlacedArtifact, Placer, PlacerError};
use crate::progress::{ProgressBus, Stage};

/// Mock implementation of the Placer trait.
///
/// Reports artifacts as published without touching the filesystem; useful
/// for exercising relocation failures and the controller's terminal
/// handling.
#[derive(Debug, Clone)]
pub struct MockPlacer {
    publish_root: PathBuf,
    /// If set, the next publish fails with this error.
    next_error: Arc<RwLock<Option<PlacerError>>>,
    /// Artifacts published so far.
    published: Arc<RwLock<Vec<PlacedArtifact>>>,
}

impl MockPlacer {
    /// Create a new mock placer publishing under the given root.
    pub fn new(publish_root: impl Into<PathBuf>) -> Self {
        Self {
            publish_root: publish_root.into(),
            next_error: Arc::new(RwLock::new(None)),
            published: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Configure the next publish to fail with the given error.
    pub async fn set_next_error(&self, error: PlacerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Artifacts published so far.
    pub async fn published(&self) -> Vec<PlacedArtifact> {
        self.published.read().await.clone()
    }
}

#[async_trait]
impl Placer for MockPlacer {
    fn name(&self) -> &str {
        "mock"
    }

    fn artifact_filename(&self, artifact_name: &str) -> String {
        format!("{}.iso", artifact_name)
    }

    fn destination_for(&self, artifact_name: &str) -> PathBuf {
        self.publish_root.join(self.artifact_filename(artifact_name))
    }

    async fn publish(
        &self,
        _work_dir: &Path,
        artifact_name: &str,
        events: &ProgressBus,
    ) -> Result<PlacedArtifact, PlacerError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        events.stage(Stage::Move, "relocating image", 97.0);

        let artifact = PlacedArtifact {
            filename: self.artifact_filename(artifact_name),
            path: self.destination_for(artifact_name),
            size_bytes: 1024,
        };
        self.published.write().await.push(artifact.clone());

        events.stage(Stage::Move, "image saved", 100.0);
        Ok(artifact)
    }
}
