//! Mock converter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::converter::{ConversionJob, Converter, ConverterError};
use crate::progress::{ProgressBus, Stage};

/// Mock implementation of the Converter trait.
///
/// Fabricates the image artifact in the working directory (so a real placer
/// can run after it) and can be configured to fail instead.
#[derive(Debug, Clone)]
pub struct MockConverter {
    /// If set, the next assemble fails with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// Whether assemble writes the output artifact.
    create_artifact: Arc<RwLock<bool>>,
    /// Raw mastering percentages to report, in order.
    progress_script: Arc<RwLock<Vec<f32>>>,
    /// Simulated duration of the whole assembly.
    assemble_duration: Arc<RwLock<Duration>>,
    /// Jobs assembled so far.
    assembled: Arc<RwLock<Vec<ConversionJob>>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            next_error: Arc::new(RwLock::new(None)),
            create_artifact: Arc::new(RwLock::new(true)),
            progress_script: Arc::new(RwLock::new(vec![25.0, 50.0, 100.0])),
            assemble_duration: Arc::new(RwLock::new(Duration::from_millis(10))),
            assembled: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Configure the next assemble to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Enable or disable writing the output artifact.
    pub async fn set_create_artifact(&self, create: bool) {
        *self.create_artifact.write().await = create;
    }

    /// Set the raw percentages reported during assembly.
    pub async fn set_progress_script(&self, script: Vec<f32>) {
        *self.progress_script.write().await = script;
    }

    /// Set the simulated assembly duration.
    pub async fn set_assemble_duration(&self, duration: Duration) {
        *self.assemble_duration.write().await = duration;
    }

    /// Number of assemblies performed.
    pub async fn assemble_count(&self) -> usize {
        self.assembled.read().await.len()
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn assemble(
        &self,
        job: &ConversionJob,
        events: &ProgressBus,
    ) -> Result<(), ConverterError> {
        self.assembled.write().await.push(job.clone());

        let duration = *self.assemble_duration.read().await;
        tokio::time::sleep(duration).await;

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        events.stage(Stage::Convert, "update files located, building image", 80.0);
        for percent in self.progress_script.read().await.iter() {
            events.stage(
                Stage::Convert,
                format!("building image... {:.1}%", percent),
                (80.0 + percent * 0.15).clamp(80.0, 95.0),
            );
        }

        if *self.create_artifact.read().await {
            tokio::fs::write(&job.output_path, b"mock image contents").await?;
        }

        events.stage(Stage::Convert, "assembly finished", 95.0);
        Ok(())
    }
}
