//! Configuration for the downloader module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the aria2-based downloader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Path to the aria2c binary.
    #[serde(default = "default_binary_path")]
    pub binary_path: PathBuf,

    /// Maximum connections per server.
    #[serde(default = "default_max_connections")]
    pub max_connections_per_server: u32,

    /// Number of parallel splits per file.
    #[serde(default = "default_split")]
    pub split: u32,

    /// Minimum split size (aria2 size syntax, e.g. "1M").
    #[serde(default = "default_min_split_size")]
    pub min_split_size: String,

    /// Interval between console summary lines in seconds. Summary lines are
    /// what the progress parser feeds on, so keep this low.
    #[serde(default = "default_summary_interval")]
    pub summary_interval_secs: u32,

    /// Additional aria2c arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_binary_path() -> PathBuf {
    PathBuf::from("aria2c")
}

fn default_max_connections() -> u32 {
    16
}

fn default_split() -> u32 {
    16
}

fn default_min_split_size() -> String {
    "1M".to_string()
}

fn default_summary_interval() -> u32 {
    1
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            binary_path: default_binary_path(),
            max_connections_per_server: default_max_connections(),
            split: default_split(),
            min_split_size: default_min_split_size(),
            summary_interval_secs: default_summary_interval(),
            extra_args: Vec::new(),
        }
    }
}

impl DownloaderConfig {
    /// Sets the aria2c binary path.
    pub fn with_binary_path(mut self, path: PathBuf) -> Self {
        self.binary_path = path;
        self
    }

    /// Sets the per-server connection bound.
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections_per_server = max;
        self
    }

    /// Sets the split count.
    pub fn with_split(mut self, split: u32) -> Self {
        self.split = split;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloaderConfig::default();
        assert_eq!(config.binary_path, PathBuf::from("aria2c"));
        assert_eq!(config.max_connections_per_server, 16);
        assert_eq!(config.split, 16);
        assert_eq!(config.min_split_size, "1M");
        assert_eq!(config.summary_interval_secs, 1);
    }

    #[test]
    fn test_config_builder() {
        let config = DownloaderConfig::default()
            .with_binary_path(PathBuf::from("/opt/aria2/bin/aria2c"))
            .with_max_connections(8)
            .with_split(4);

        assert_eq!(config.binary_path, PathBuf::from("/opt/aria2/bin/aria2c"));
        assert_eq!(config.max_connections_per_server, 8);
        assert_eq!(config.split, 4);
    }

    #[test]
    fn test_config_serialization() {
        let config = DownloaderConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DownloaderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.split, config.split);
    }
}
