//! Pipeline module: the staged build orchestrator.
//!
//! A build session walks the strict stage order
//! `INIT -> DOWNLOAD -> CONVERT -> MOVE -> COMPLETE`, with an implicit
//! terminal `ERROR` reachable from any stage. The controller owns the
//! session end-to-end: it creates the working directory, renders the
//! downloader input list, delegates to the download/convert/place drivers,
//! and guarantees that the subscriber sees exactly one terminal event and
//! that the working directory is cleaned up afterwards.
//!
//! # Example
//!
//! ```ignore
//! use isoforge_core::pipeline::{PipelineConfig, PipelineController};
//! use isoforge_core::progress::ProgressBus;
//!
//! let controller = PipelineController::new(config, downloader, converter, placer);
//! let (subscriber, rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! // Returns immediately; events stream to the subscriber.
//! let handle = controller.spawn(manifest, subscriber)?;
//! ```

mod config;
mod controller;
mod error;
mod session;

pub use config::PipelineConfig;
pub use controller::{PipelineController, SessionHandle};
pub use error::PipelineError;
pub use session::{sanitize_artifact_name, ArtifactInfo, PipelineSession};
