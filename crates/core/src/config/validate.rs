use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Downloader connection bounds are non-zero
/// - Placer artifact extension is non-empty
/// - Scratch and publish roots do not overlap
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.downloader.max_connections_per_server == 0 {
        return Err(ConfigError::ValidationError(
            "downloader.max_connections_per_server cannot be 0".to_string(),
        ));
    }

    if config.downloader.split == 0 {
        return Err(ConfigError::ValidationError(
            "downloader.split cannot be 0".to_string(),
        ));
    }

    if config.placer.artifact_extension.is_empty() {
        return Err(ConfigError::ValidationError(
            "placer.artifact_extension cannot be empty".to_string(),
        ));
    }

    if config.pipeline.scratch_root == config.placer.publish_root {
        return Err(ConfigError::ValidationError(
            "pipeline.scratch_root and placer.publish_root must differ".to_string(),
        ));
    }

    Ok(())
}
