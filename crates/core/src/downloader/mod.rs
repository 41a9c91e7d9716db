//! Downloader module for fetching manifest files.
//!
//! This module provides the `Downloader` trait and the aria2-based
//! implementation that drives the external multi-connection downloader
//! against a session's input list, translating its console output into
//! session progress events.

mod aria2;
mod config;
mod error;
mod traits;

pub use aria2::Aria2Downloader;
pub use config::DownloaderConfig;
pub use error::DownloaderError;
pub use traits::{DownloadJob, Downloader};
