//! Placer module for publishing the finished image.
//!
//! This module provides the `Placer` trait and the filesystem implementation
//! that locates the assembled image in a session's working directory and
//! moves it to its final location under the publish root, creating parent
//! directories as needed and overwriting a previous image with the same
//! name.

mod config;
mod error;
mod fs_placer;
mod traits;
mod types;

pub use config::PlacerConfig;
pub use error::PlacerError;
pub use fs_placer::FsPlacer;
pub use traits::Placer;
pub use types::PlacedArtifact;
