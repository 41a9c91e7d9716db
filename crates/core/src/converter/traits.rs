//! Trait definitions for the converter module.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::progress::ProgressBus;

use super::error::ConverterError;

/// One convert stage invocation for a session.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Session identifier, for logging.
    pub session_id: String,
    /// Directory containing the downloaded update files; also the tool's
    /// working directory.
    pub work_dir: PathBuf,
    /// Where the tool should write the finished image.
    pub output_path: PathBuf,
}

/// A converter that can assemble downloaded update files into a disk image.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Assembles the image, reporting progress through the session bus.
    ///
    /// Implementations emit convert-stage events only; the terminal event is
    /// owned by the pipeline controller.
    async fn assemble(&self, job: &ConversionJob, events: &ProgressBus)
        -> Result<(), ConverterError>;
}
