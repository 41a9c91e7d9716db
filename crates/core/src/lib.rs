//! Core library for isoforge: a staged pipeline that turns a resolved
//! update manifest into a published installable disk image.
//!
//! The flow per session: resolve a manifest from the remote catalog, render
//! the downloader input list, fetch the files with aria2, assemble them
//! into an image with the external conversion tool, and move the result to
//! the publish root, streaming live stage/progress events to the requesting
//! client's channel the whole way.

pub mod catalog;
pub mod config;
pub mod converter;
pub mod downloader;
pub mod manifest;
pub mod pipeline;
pub mod placer;
pub mod progress;
pub mod testing;

pub use catalog::{
    CatalogClient, CatalogConfig, CatalogError, FileSource, UpdateManifest, DEFAULT_EDITION,
    DEFAULT_LANGUAGE,
};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use converter::{ConversionJob, Converter, ConverterConfig, ConverterError, ScriptConverter};
pub use downloader::{Aria2Downloader, DownloadJob, Downloader, DownloaderConfig, DownloaderError};
pub use pipeline::{
    sanitize_artifact_name, ArtifactInfo, PipelineConfig, PipelineController, PipelineError,
    PipelineSession, SessionHandle,
};
pub use placer::{FsPlacer, PlacedArtifact, Placer, PlacerConfig, PlacerError};
pub use progress::{ProgressBus, Stage, Subscriber, WireEvent};
