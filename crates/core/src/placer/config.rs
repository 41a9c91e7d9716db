//! Configuration for the placer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the filesystem placer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacerConfig {
    /// Root directory published images live under. The placer never writes
    /// outside this root.
    #[serde(default = "default_publish_root")]
    pub publish_root: PathBuf,

    /// Extension (without dot) identifying the finished image artifact.
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,
}

fn default_publish_root() -> PathBuf {
    PathBuf::from("/var/lib/isoforge/images")
}

fn default_artifact_extension() -> String {
    "iso".to_string()
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            publish_root: default_publish_root(),
            artifact_extension: default_artifact_extension(),
        }
    }
}

impl PlacerConfig {
    /// Sets the publish root.
    pub fn with_publish_root(mut self, root: PathBuf) -> Self {
        self.publish_root = root;
        self
    }

    /// Sets the artifact extension.
    pub fn with_artifact_extension(mut self, extension: impl Into<String>) -> Self {
        self.artifact_extension = extension.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlacerConfig::default();
        assert_eq!(config.publish_root, PathBuf::from("/var/lib/isoforge/images"));
        assert_eq!(config.artifact_extension, "iso");
    }

    #[test]
    fn test_config_builder() {
        let config = PlacerConfig::default()
            .with_publish_root(PathBuf::from("/srv/images"))
            .with_artifact_extension("img");

        assert_eq!(config.publish_root, PathBuf::from("/srv/images"));
        assert_eq!(config.artifact_extension, "img");
    }
}
