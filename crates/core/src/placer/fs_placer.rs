//! Filesystem placer implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::progress::{ProgressBus, Stage};

use super::config::PlacerConfig;
use super::error::PlacerError;
use super::traits::Placer;
use super::types::PlacedArtifact;

/// Filesystem-based placer implementation.
pub struct FsPlacer {
    config: PlacerConfig,
}

impl FsPlacer {
    /// Creates a new filesystem placer with the given configuration.
    pub fn new(config: PlacerConfig) -> Self {
        Self { config }
    }

    /// Creates a placer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PlacerConfig::default())
    }

    /// Attempts to move a file atomically (rename).
    async fn try_atomic_move(source: &Path, destination: &Path) -> Result<bool, std::io::Error> {
        match fs::rename(source, destination).await {
            Ok(()) => Ok(true),
            Err(e) => {
                // Cross-filesystem moves fail with EXDEV (18 on Linux); the
                // scratch and publish roots routinely live on different
                // mounts, so fall back to copy there.
                if e.kind() == std::io::ErrorKind::CrossesDevices || e.raw_os_error() == Some(18) {
                    Ok(false)
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Finds the finished image among the immediate entries of the working
    /// directory.
    ///
    /// Tie-break: when the tool left more than one candidate, the
    /// lexicographically first filename wins and the rest are logged.
    async fn find_artifact(&self, work_dir: &Path) -> Result<PathBuf, PlacerError> {
        let mut matches: Vec<PathBuf> = Vec::new();
        let mut entries = fs::read_dir(work_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let is_artifact = path
                .extension()
                .map(|ext| {
                    ext.to_string_lossy()
                        .eq_ignore_ascii_case(&self.config.artifact_extension)
                })
                .unwrap_or(false);
            if is_artifact {
                matches.push(path);
            }
        }

        matches.sort();
        match matches.len() {
            0 => Err(PlacerError::ArtifactNotFound {
                dir: work_dir.to_path_buf(),
            }),
            1 => Ok(matches.remove(0)),
            n => {
                warn!(
                    "found {} candidate artifacts in {}, publishing {}",
                    n,
                    work_dir.display(),
                    matches[0].display()
                );
                Ok(matches.remove(0))
            }
        }
    }
}

#[async_trait]
impl Placer for FsPlacer {
    fn name(&self) -> &str {
        "fs"
    }

    fn artifact_filename(&self, artifact_name: &str) -> String {
        format!("{}.{}", artifact_name, self.config.artifact_extension)
    }

    fn destination_for(&self, artifact_name: &str) -> PathBuf {
        self.config
            .publish_root
            .join(self.artifact_filename(artifact_name))
    }

    async fn publish(
        &self,
        work_dir: &Path,
        artifact_name: &str,
        events: &ProgressBus,
    ) -> Result<PlacedArtifact, PlacerError> {
        // A name with path components would land outside the publish root.
        if artifact_name.contains(['/', '\\']) || artifact_name.contains("..") {
            return Err(PlacerError::InvalidArtifactName {
                name: artifact_name.to_string(),
            });
        }

        events.stage(Stage::Move, "relocating image", 97.0);

        let source = self.find_artifact(work_dir).await?;
        let destination = self.destination_for(artifact_name);

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                PlacerError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                }
            })?;
        }

        debug!(
            "moving {} -> {}",
            source.display(),
            destination.display()
        );

        let moved = Self::try_atomic_move(&source, &destination)
            .await
            .map_err(|e| PlacerError::move_failed(source.clone(), destination.clone(), e))?;

        if !moved {
            fs::copy(&source, &destination)
                .await
                .map_err(|e| PlacerError::move_failed(source.clone(), destination.clone(), e))?;
            if let Err(e) = fs::remove_file(&source).await {
                warn!("failed to remove source after copy: {}", e);
            }
        }

        let metadata = fs::metadata(&destination).await?;
        let filename = destination
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| artifact_name.to_string());

        events.stage(Stage::Move, "image saved", 100.0);

        Ok(PlacedArtifact {
            filename,
            path: destination,
            size_bytes: metadata.len(),
        })
    }
}
