//! Per-session progress bus implementation.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

use super::events::{Stage, WireEvent};

/// Handle to the session's live channel. Owned by the out-of-scope transport
/// layer; the bus only ever sends.
pub type Subscriber = mpsc::UnboundedSender<WireEvent>;

#[derive(Debug)]
struct BusState {
    last_progress: f32,
    terminal: bool,
}

/// Event sink for exactly one build session.
///
/// All stage emissions funnel through here so the two wire invariants hold
/// structurally rather than by call-order discipline:
///
/// - the delivered percentage never decreases within a session
/// - exactly one terminal event is delivered, and nothing after it
#[derive(Debug, Clone)]
pub struct ProgressBus {
    subscriber: Subscriber,
    state: Arc<Mutex<BusState>>,
}

impl ProgressBus {
    /// Creates a bus addressing the given subscriber handle.
    pub fn new(subscriber: Subscriber) -> Self {
        Self {
            subscriber,
            state: Arc::new(Mutex::new(BusState {
                last_progress: 0.0,
                terminal: false,
            })),
        }
    }

    /// Creates a bus together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<WireEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Emits a stage progress event.
    ///
    /// The percentage is clamped to `[0, 100]`; a value below the session's
    /// high-water mark is delivered at the high-water mark instead. Silently
    /// dropped once a terminal event has been emitted.
    pub fn stage(&self, stage: Stage, message: impl Into<String>, progress: f32) {
        let delivered = {
            let mut state = self.lock_state();
            if state.terminal {
                return;
            }
            let delivered = progress.clamp(0.0, 100.0).max(state.last_progress);
            state.last_progress = delivered;
            delivered
        };

        self.send(WireEvent::Progress {
            stage,
            message: message.into(),
            progress: delivered,
        });
    }

    /// Emits the terminal success event. At most one terminal event is ever
    /// delivered; later calls to any emission method are no-ops.
    pub fn complete(&self, filename: impl Into<String>, path: impl Into<PathBuf>) {
        if !self.enter_terminal() {
            return;
        }
        self.send(WireEvent::Complete {
            message: "image build complete".to_string(),
            filename: filename.into(),
            path: path.into(),
        });
    }

    /// Emits the terminal error event. Same exactly-once guarantee as
    /// [`ProgressBus::complete`].
    pub fn error(&self, summary: impl Into<String>, details: Option<String>) {
        if !self.enter_terminal() {
            return;
        }
        self.send(WireEvent::Error {
            error: summary.into(),
            details,
        });
    }

    /// Highest percentage delivered so far.
    pub fn last_progress(&self) -> f32 {
        self.lock_state().last_progress
    }

    /// Whether a terminal event has been emitted.
    pub fn is_terminal(&self) -> bool {
        self.lock_state().terminal
    }

    /// Flips the terminal flag; returns false if it was already set.
    fn enter_terminal(&self) -> bool {
        let mut state = self.lock_state();
        if state.terminal {
            debug!("suppressing duplicate terminal event");
            return false;
        }
        state.terminal = true;
        true
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send(&self, event: WireEvent) {
        // Ignore send errors - they just mean the subscriber went away.
        let _ = self.subscriber.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<WireEvent>) -> Vec<WireEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_progress_is_monotonic() {
        let (bus, mut rx) = ProgressBus::channel();

        bus.stage(Stage::Download, "halfway", 50.0);
        bus.stage(Stage::Download, "late update", 30.0);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        match &events[1] {
            WireEvent::Progress { progress, message, .. } => {
                assert_eq!(*progress, 50.0);
                assert_eq!(message, "late update");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        let (bus, mut rx) = ProgressBus::channel();

        bus.stage(Stage::Convert, "overshoot", 120.0);

        match &drain(&mut rx)[0] {
            WireEvent::Progress { progress, .. } => assert_eq!(*progress, 100.0),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_single_terminal_event() {
        let (bus, mut rx) = ProgressBus::channel();

        bus.complete("a.iso", "/images/a.iso");
        bus.complete("b.iso", "/images/b.iso");
        bus.error("too late", None);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], WireEvent::Complete { .. }));
        assert!(bus.is_terminal());
    }

    #[test]
    fn test_no_progress_after_terminal() {
        let (bus, mut rx) = ProgressBus::channel();

        bus.stage(Stage::Download, "downloading", 20.0);
        bus.error("download failed", Some("exit code 1".to_string()));
        bus.stage(Stage::Convert, "should not appear", 80.0);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], WireEvent::Error { .. }));
    }

    #[test]
    fn test_dropped_subscriber_is_ignored() {
        let (bus, rx) = ProgressBus::channel();
        drop(rx);

        // Must not panic or error.
        bus.stage(Stage::Init, "preparing", 0.0);
        bus.complete("a.iso", "/images/a.iso");
    }
}
