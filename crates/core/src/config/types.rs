use serde::{Deserialize, Serialize};

use crate::catalog::CatalogConfig;
use crate::converter::ConverterConfig;
use crate::downloader::DownloaderConfig;
use crate::pipeline::PipelineConfig;
use crate::placer::PlacerConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub placer: PlacerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}
