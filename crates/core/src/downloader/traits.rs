//! Trait definitions for the downloader module.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::progress::ProgressBus;

use super::error::DownloaderError;

/// One download stage invocation for a session.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    /// Session identifier, for logging.
    pub session_id: String,
    /// Path to the rendered input list.
    pub input_list: PathBuf,
    /// Directory the files are fetched into.
    pub work_dir: PathBuf,
}

/// A downloader that can fetch a session's manifest files.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Returns the name of this downloader implementation.
    fn name(&self) -> &str;

    /// Fetches all files named by the job's input list into the working
    /// directory, reporting progress through the session bus.
    ///
    /// Implementations emit download-stage events only; the terminal event
    /// is owned by the pipeline controller.
    async fn fetch(&self, job: &DownloadJob, events: &ProgressBus) -> Result<(), DownloaderError>;
}
