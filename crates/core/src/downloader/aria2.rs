//! aria2-based downloader implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use std::collections::VecDeque;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::progress::{ProgressBus, Stage};

use super::config::DownloaderConfig;
use super::error::DownloaderError;
use super::traits::{DownloadJob, Downloader};

/// Session progress at which the download stage completes.
const DOWNLOAD_DONE_PROGRESS: f32 = 70.0;

/// Lines of diagnostic output kept for failure detail.
const STDERR_TAIL_LINES: usize = 20;

/// aria2-based downloader implementation.
///
/// Drives `aria2c` against the session input list with resumable, parallel,
/// checksum-verified transfer and no pre-allocation, mapping its periodic
/// console summaries into download-stage progress.
pub struct Aria2Downloader {
    config: DownloaderConfig,
}

impl Aria2Downloader {
    /// Creates a new downloader with the given configuration.
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    /// Creates a downloader with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(DownloaderConfig::default())
    }

    /// Builds the aria2c argument list for a job.
    fn build_args(&self, job: &DownloadJob) -> Vec<String> {
        let mut args = vec![
            format!("--input-file={}", job.input_list.display()),
            format!("--dir={}", job.work_dir.display()),
            "--continue=true".to_string(),
            format!(
                "--max-connection-per-server={}",
                self.config.max_connections_per_server
            ),
            format!("--split={}", self.config.split),
            format!("--min-split-size={}", self.config.min_split_size),
            "--file-allocation=none".to_string(),
            "--check-integrity=true".to_string(),
            format!("--summary-interval={}", self.config.summary_interval_secs),
            "--download-result=full".to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args
    }
}

/// Extracts the overall percentage from one line of aria2 console output.
///
/// Summary lines look like `[#8a1f2d 512MiB/1.0GiB(50%) CN:16 DL:12MiB]`;
/// the first parenthesized integer percentage wins.
pub(crate) fn parse_progress_line(line: &str) -> Option<u8> {
    let re = Regex::new(r"\((\d+)%\)").ok()?;
    let caps = re.captures(line)?;
    caps.get(1)?.as_str().parse::<u8>().ok()
}

/// Maps a raw downloader percentage into the session progress window.
///
/// The download stage owns the `[10, 70]` slice of the session bar.
pub(crate) fn map_download_percent(percent: u8) -> f32 {
    (10.0 + f32::from(percent) * 0.6).clamp(10.0, DOWNLOAD_DONE_PROGRESS)
}

/// Collects a bounded tail of the downloader's diagnostic stream.
async fn collect_stderr_tail(stderr: tokio::process::ChildStderr) -> String {
    let mut lines = BufReader::new(stderr).lines();
    let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

    while let Ok(Some(line)) = lines.next_line().await {
        debug!("aria2c stderr: {}", line);
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    tail.into_iter().collect::<Vec<_>>().join("\n")
}

#[async_trait]
impl Downloader for Aria2Downloader {
    fn name(&self) -> &str {
        "aria2"
    }

    async fn fetch(&self, job: &DownloadJob, events: &ProgressBus) -> Result<(), DownloaderError> {
        info!(
            "starting downloader for session {} into {}",
            job.session_id,
            job.work_dir.display()
        );

        let mut child = Command::new(&self.config.binary_path)
            .args(self.build_args(job))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DownloaderError::BinaryNotFound {
                        path: self.config.binary_path.clone(),
                    }
                } else {
                    DownloaderError::Io(e)
                }
            })?;

        let stdout = child.stdout.take().expect("stdout should be captured");
        let stderr = child.stderr.take().expect("stderr should be captured");

        let stderr_task = tokio::spawn(collect_stderr_tail(stderr));

        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!("aria2c stdout: {}", line);
            if let Some(percent) = parse_progress_line(&line) {
                events.stage(
                    Stage::Download,
                    format!("downloading update files... {}%", percent),
                    map_download_percent(percent),
                );
            }
        }

        let status = child.wait().await?;
        let detail = stderr_task.await.unwrap_or_default();

        if status.success() {
            events.stage(Stage::Download, "download complete", DOWNLOAD_DONE_PROGRESS);
            Ok(())
        } else {
            Err(DownloaderError::failed(
                status.code().unwrap_or(-1),
                if detail.is_empty() {
                    None
                } else {
                    Some(detail)
                },
            ))
        }
    }
}
