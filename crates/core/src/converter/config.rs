//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the script-based image converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path to the image-assembly script. The converter fails fast when
    /// nothing is installed here.
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,

    /// Shell used to run the script.
    #[serde(default = "default_shell_path")]
    pub shell_path: PathBuf,

    /// Scratch workspace handed to the tool via its environment.
    #[serde(default = "default_tool_work_dir")]
    pub tool_work_dir: PathBuf,
}

fn default_script_path() -> PathBuf {
    PathBuf::from("/usr/local/bin/create-install-iso")
}

fn default_shell_path() -> PathBuf {
    PathBuf::from("bash")
}

fn default_tool_work_dir() -> PathBuf {
    PathBuf::from("/var/lib/isoforge/convert")
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            script_path: default_script_path(),
            shell_path: default_shell_path(),
            tool_work_dir: default_tool_work_dir(),
        }
    }
}

impl ConverterConfig {
    /// Sets the assembly script path.
    pub fn with_script_path(mut self, path: PathBuf) -> Self {
        self.script_path = path;
        self
    }

    /// Sets the tool scratch workspace.
    pub fn with_tool_work_dir(mut self, dir: PathBuf) -> Self {
        self.tool_work_dir = dir;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert_eq!(
            config.script_path,
            PathBuf::from("/usr/local/bin/create-install-iso")
        );
        assert_eq!(config.shell_path, PathBuf::from("bash"));
    }

    #[test]
    fn test_config_builder() {
        let config = ConverterConfig::default()
            .with_script_path(PathBuf::from("/opt/tools/mkimage"))
            .with_tool_work_dir(PathBuf::from("/tmp/convert"));

        assert_eq!(config.script_path, PathBuf::from("/opt/tools/mkimage"));
        assert_eq!(config.tool_work_dir, PathBuf::from("/tmp/convert"));
    }

    #[test]
    fn test_config_serialization() {
        let config = ConverterConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ConverterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.script_path, config.script_path);
    }
}
