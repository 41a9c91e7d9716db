//! Pipeline controller implementation.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::catalog::UpdateManifest;
use crate::converter::{ConversionJob, Converter};
use crate::downloader::{DownloadJob, Downloader};
use crate::manifest;
use crate::placer::Placer;
use crate::progress::{ProgressBus, Stage, Subscriber};

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::session::{ArtifactInfo, PipelineSession};

type TargetRegistry = Arc<Mutex<HashSet<PathBuf>>>;

/// Releases a claimed publish target when dropped, so a cancelled or
/// panicked session never wedges its path.
struct TargetClaim {
    path: PathBuf,
    registry: TargetRegistry,
}

impl Drop for TargetClaim {
    fn drop(&mut self) {
        let mut targets = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        targets.remove(&self.path);
    }
}

/// Handle to a spawned build session.
#[derive(Debug)]
pub struct SessionHandle {
    /// Session identifier.
    pub session_id: String,
    /// Path the image will be published to on success.
    pub final_path: PathBuf,
    handle: JoinHandle<Result<ArtifactInfo, PipelineError>>,
}

impl SessionHandle {
    /// Aborts the session. In-flight external processes are killed with the
    /// task; the claimed publish target is released.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Waits for the session to end. Returns `None` if it was cancelled.
    pub async fn wait(self) -> Option<Result<ArtifactInfo, PipelineError>> {
        self.handle.await.ok()
    }
}

/// Drives build sessions through the staged pipeline.
///
/// One controller serves many concurrent sessions; sessions share nothing
/// but the filesystem and the publish-target registry that rejects two
/// simultaneous builds of the same image.
pub struct PipelineController<D, C, P>
where
    D: Downloader,
    C: Converter,
    P: Placer,
{
    config: PipelineConfig,
    downloader: Arc<D>,
    converter: Arc<C>,
    placer: Arc<P>,
    active_targets: TargetRegistry,
}

impl<D, C, P> Clone for PipelineController<D, C, P>
where
    D: Downloader,
    C: Converter,
    P: Placer,
{
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            downloader: Arc::clone(&self.downloader),
            converter: Arc::clone(&self.converter),
            placer: Arc::clone(&self.placer),
            active_targets: Arc::clone(&self.active_targets),
        }
    }
}

impl<D, C, P> PipelineController<D, C, P>
where
    D: Downloader + 'static,
    C: Converter + 'static,
    P: Placer + 'static,
{
    /// Creates a new controller.
    pub fn new(config: PipelineConfig, downloader: D, converter: C, placer: P) -> Self {
        Self {
            config,
            downloader: Arc::new(downloader),
            converter: Arc::new(converter),
            placer: Arc::new(placer),
            active_targets: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Starts a session in the background and returns immediately.
    ///
    /// Fails up front with [`PipelineError::PublishPathBusy`] when another
    /// in-flight session already publishes to the same path.
    pub fn spawn(
        &self,
        manifest: UpdateManifest,
        subscriber: Subscriber,
    ) -> Result<SessionHandle, PipelineError> {
        let session = PipelineSession::new(&manifest.update_name, &self.config.scratch_root);
        let final_path = self.placer.destination_for(&session.artifact_name);
        let claim = self.claim_target(final_path.clone())?;

        let events = ProgressBus::new(subscriber);
        let session_id = session.id.clone();
        let controller = self.clone();
        let handle = tokio::spawn(async move {
            controller.run_session(session, manifest, events, claim).await
        });

        Ok(SessionHandle {
            session_id,
            final_path,
            handle,
        })
    }

    /// Runs one session to completion on the current task.
    pub async fn run(
        &self,
        manifest: UpdateManifest,
        subscriber: Subscriber,
    ) -> Result<ArtifactInfo, PipelineError> {
        let session = PipelineSession::new(&manifest.update_name, &self.config.scratch_root);
        let final_path = self.placer.destination_for(&session.artifact_name);
        let claim = self.claim_target(final_path)?;
        let events = ProgressBus::new(subscriber);

        self.run_session(session, manifest, events, claim).await
    }

    fn claim_target(&self, path: PathBuf) -> Result<TargetClaim, PipelineError> {
        let mut targets = self
            .active_targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !targets.insert(path.clone()) {
            return Err(PipelineError::PublishPathBusy { path });
        }
        Ok(TargetClaim {
            path,
            registry: Arc::clone(&self.active_targets),
        })
    }

    /// Walks the session through all stages and always leaves exactly one
    /// terminal event behind.
    async fn run_session(
        &self,
        session: PipelineSession,
        manifest: UpdateManifest,
        events: ProgressBus,
        _claim: TargetClaim,
    ) -> Result<ArtifactInfo, PipelineError> {
        info!(
            "session {}: building image for '{}'",
            session.id, session.update_name
        );

        let result = self.drive(&session, &manifest, &events).await;

        match &result {
            Ok(artifact) => {
                info!(
                    "session {}: published {} ({} bytes)",
                    session.id, artifact.filename, artifact.size_bytes
                );
                events.complete(artifact.filename.clone(), artifact.path.clone());
            }
            Err(e) => {
                error!("session {}: image build failed: {}", session.id, e);
                events.error(e.summary(), e.detail());
            }
        }

        self.discard_work_dir(&session).await;
        result
    }

    /// The happy path through the stage sequence; any error unwinds to
    /// `run_session` for terminal handling.
    async fn drive(
        &self,
        session: &PipelineSession,
        manifest: &UpdateManifest,
        events: &ProgressBus,
    ) -> Result<ArtifactInfo, PipelineError> {
        // INIT
        events.stage(Stage::Init, "preparing image build", 0.0);
        tokio::fs::create_dir_all(&session.work_dir)
            .await
            .map_err(|e| PipelineError::DirectoryCreateFailed {
                path: session.work_dir.clone(),
                source: e,
            })?;

        events.stage(Stage::Init, "writing transfer list", 5.0);
        let input_list = manifest::write_input_file(manifest, &session.work_dir)
            .await
            .map_err(PipelineError::ManifestWriteFailed)?;

        // DOWNLOAD
        events.stage(Stage::Download, "downloading update files", 10.0);
        let download = DownloadJob {
            session_id: session.id.clone(),
            input_list,
            work_dir: session.work_dir.clone(),
        };
        self.downloader.fetch(&download, events).await?;

        // CONVERT
        events.stage(Stage::Convert, "creating disk image", 75.0);
        let conversion = ConversionJob {
            session_id: session.id.clone(),
            work_dir: session.work_dir.clone(),
            output_path: session
                .work_dir
                .join(self.placer.artifact_filename(&session.artifact_name)),
        };
        self.converter.assemble(&conversion, events).await?;

        // MOVE
        let placed = self
            .placer
            .publish(&session.work_dir, &session.artifact_name, events)
            .await?;

        Ok(ArtifactInfo {
            session_id: session.id.clone(),
            filename: placed.filename,
            path: placed.path,
            size_bytes: placed.size_bytes,
        })
    }

    /// Best-effort removal of the session working directory.
    async fn discard_work_dir(&self, session: &PipelineSession) {
        if self.config.keep_work_dir {
            debug!(
                "session {}: keeping working directory {}",
                session.id,
                session.work_dir.display()
            );
            return;
        }

        if let Err(e) = tokio::fs::remove_dir_all(&session.work_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "session {}: failed to remove working directory {}: {}",
                    session.id,
                    session.work_dir.display(),
                    e
                );
            }
        }
    }
}
