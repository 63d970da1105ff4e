//! Progress-callback trait for per-turn relay events.
//!
//! Inject an [`Arc<dyn TurnProgressCallback>`] via
//! [`crate::config::RelayConfigBuilder::progress_callback`] to observe a turn
//! as it moves through the pipeline: which files were accepted or rejected,
//! when the webhook call starts, and how the turn ended. A chat host can use
//! it to post replies as they happen instead of waiting for the
//! [`crate::TurnReport`].
//!
//! # Example
//!
//! ```rust
//! use attachment_relay::{RelayConfig, TurnProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct RejectCounter {
//!     rejected: AtomicUsize,
//! }
//!
//! impl TurnProgressCallback for RejectCounter {
//!     fn on_file_rejected(&self, name: &str, error: &str) {
//!         self.rejected.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{name}: {error}");
//!     }
//! }
//!
//! let counter = Arc::new(RejectCounter { rejected: AtomicUsize::new(0) });
//!
//! let config = RelayConfig::builder("https://hooks.example.com/chat")
//!     .progress_callback(counter as Arc<dyn TurnProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::relay::TurnStatus;
use std::sync::Arc;

/// Called by the relay as it processes one chat turn.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync`: a single
/// [`crate::Relay`] may serve several sessions at once.
pub trait TurnProgressCallback: Send + Sync {
    /// Called once the turn passed the empty-message gate.
    ///
    /// # Arguments
    /// * `file_count` — number of attachments about to be normalised
    fn on_turn_start(&self, file_count: usize) {
        let _ = file_count;
    }

    /// Called when an attachment has been normalised.
    ///
    /// # Arguments
    /// * `name`       — final file name (after any `.png` rename)
    /// * `size_bytes` — decoded size of the content that will be sent
    fn on_file_accepted(&self, name: &str, size_bytes: usize) {
        let _ = (name, size_bytes);
    }

    /// Called when an attachment is skipped.
    ///
    /// # Arguments
    /// * `name`  — file name as supplied
    /// * `error` — human-readable reason
    fn on_file_rejected(&self, name: &str, error: &str) {
        let _ = (name, error);
    }

    /// Called right before the webhook request is sent.
    fn on_dispatch(&self, file_count: usize) {
        let _ = file_count;
    }

    /// Called once the turn is over, whatever the outcome.
    fn on_turn_complete(&self, status: TurnStatus) {
        let _ = status;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl TurnProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RelayConfig`].
pub type ProgressCallback = Arc<dyn TurnProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        accepted: AtomicUsize,
        rejected: AtomicUsize,
        dispatched: AtomicUsize,
        final_status: Mutex<Option<TurnStatus>>,
    }

    impl TurnProgressCallback for TrackingCallback {
        fn on_file_accepted(&self, _name: &str, _size_bytes: usize) {
            self.accepted.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_rejected(&self, _name: &str, _error: &str) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
        }

        fn on_dispatch(&self, file_count: usize) {
            self.dispatched.store(file_count, Ordering::SeqCst);
        }

        fn on_turn_complete(&self, status: TurnStatus) {
            *self.final_status.lock().unwrap() = Some(status);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_turn_start(2);
        cb.on_file_accepted("a.png", 10);
        cb.on_file_rejected("b.txt", "not allowed");
        cb.on_dispatch(1);
        cb.on_turn_complete(TurnStatus::Delivered);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_turn_start(3);
        tracker.on_file_accepted("a.png", 1);
        tracker.on_file_accepted("b.png", 2);
        tracker.on_file_rejected("c.txt", "nope");
        tracker.on_dispatch(2);
        tracker.on_turn_complete(TurnStatus::DispatchFailed);

        assert_eq!(tracker.accepted.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.rejected.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.dispatched.load(Ordering::SeqCst), 2);
        assert_eq!(
            *tracker.final_status.lock().unwrap(),
            Some(TurnStatus::DispatchFailed)
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_turn_start(0);
        cb.on_turn_complete(TurnStatus::Rejected);
    }
}
