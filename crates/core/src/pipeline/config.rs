//! Configuration for the pipeline module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the pipeline controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory session working directories are created under.
    #[serde(default = "default_scratch_root")]
    pub scratch_root: PathBuf,

    /// Keep working directories after the session ends. Debugging knob;
    /// normal operation removes them on both success and failure.
    #[serde(default)]
    pub keep_work_dir: bool,
}

fn default_scratch_root() -> PathBuf {
    std::env::temp_dir().join("isoforge")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scratch_root: default_scratch_root(),
            keep_work_dir: false,
        }
    }
}

impl PipelineConfig {
    /// Sets the scratch root.
    pub fn with_scratch_root(mut self, root: PathBuf) -> Self {
        self.scratch_root = root;
        self
    }

    /// Keeps working directories after sessions end.
    pub fn with_keep_work_dir(mut self, keep: bool) -> Self {
        self.keep_work_dir = keep;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!(config.scratch_root.ends_with("isoforge"));
        assert!(!config.keep_work_dir);
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::default()
            .with_scratch_root(PathBuf::from("/tmp/builds"))
            .with_keep_work_dir(true);

        assert_eq!(config.scratch_root, PathBuf::from("/tmp/builds"));
        assert!(config.keep_work_dir);
    }
}
