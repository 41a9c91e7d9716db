//! Progress module for per-session event delivery.
//!
//! This module provides the `ProgressBus`, the single funnel through which a
//! build session reports progress to its subscriber. The bus normalizes stage
//! events into wire events, enforces a monotonically non-decreasing
//! percentage, and guarantees that exactly one terminal event (complete or
//! error) is delivered per session.
//!
//! # Example
//!
//! ```ignore
//! use isoforge_core::progress::{ProgressBus, Stage};
//!
//! let (bus, mut rx) = ProgressBus::channel();
//! bus.stage(Stage::Download, "downloading update files", 10.0);
//! bus.complete("build.iso", "/var/lib/isoforge/images/build.iso");
//!
//! // Delivered in emission order; nothing after the terminal event.
//! while let Ok(event) = rx.try_recv() {
//!     println!("{:?}", event);
//! }
//! ```

mod bus;
mod events;

pub use bus::{ProgressBus, Subscriber};
pub use events::{Stage, WireEvent};
