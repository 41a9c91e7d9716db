//! Mock downloader for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::downloader::{DownloadJob, Downloader, DownloaderError};
use crate::progress::{ProgressBus, Stage};

/// Mock implementation of the Downloader trait.
///
/// Emits a scripted sequence of raw downloader percentages (mapped through
/// the real progress window) and can be configured to fail.
#[derive(Debug, Clone)]
pub struct MockDownloader {
    /// Raw percentages to report, in order.
    progress_script: Arc<RwLock<Vec<u8>>>,
    /// If set, the next fetch fails with this error.
    next_error: Arc<RwLock<Option<DownloaderError>>>,
    /// Simulated duration of the whole fetch.
    fetch_duration: Arc<RwLock<Duration>>,
    /// Jobs fetched so far.
    fetched: Arc<RwLock<Vec<DownloadJob>>>,
}

impl Default for MockDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDownloader {
    /// Create a new mock downloader.
    pub fn new() -> Self {
        Self {
            progress_script: Arc::new(RwLock::new(vec![25, 50, 75, 100])),
            next_error: Arc::new(RwLock::new(None)),
            fetch_duration: Arc::new(RwLock::new(Duration::from_millis(10))),
            fetched: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the raw percentages reported during fetch.
    pub async fn set_progress_script(&self, script: Vec<u8>) {
        *self.progress_script.write().await = script;
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: DownloaderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated fetch duration.
    pub async fn set_fetch_duration(&self, duration: Duration) {
        *self.fetch_duration.write().await = duration;
    }

    /// Number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetched.read().await.len()
    }

    /// Jobs fetched so far.
    pub async fn fetched_jobs(&self) -> Vec<DownloadJob> {
        self.fetched.read().await.clone()
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, job: &DownloadJob, events: &ProgressBus) -> Result<(), DownloaderError> {
        self.fetched.write().await.push(job.clone());

        let duration = *self.fetch_duration.read().await;
        tokio::time::sleep(duration).await;

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        for percent in self.progress_script.read().await.iter() {
            events.stage(
                Stage::Download,
                format!("downloading update files... {}%", percent),
                (10.0 + f32::from(*percent) * 0.6).clamp(10.0, 70.0),
            );
        }

        events.stage(Stage::Download, "download complete", 70.0);
        Ok(())
    }
}
