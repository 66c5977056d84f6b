//! Termination handshake between connection tasks and the main task.
//!
//! A session that receives the stop directive fires the [`TerminationLatch`];
//! the main task parked on [`TerminationLatch::wait`] wakes up and runs the
//! shutdown sequence, notifying every registered [`TerminationListener`].

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

/// One-shot, multi-waiter signal.
///
/// Starts pending, becomes signaled on the first [`signal`](Self::signal) and
/// never resets. Waiters that arrive after the transition return immediately.
#[derive(Debug)]
pub struct TerminationLatch {
    tx: watch::Sender<bool>,
}

impl TerminationLatch {
    /// Create a pending latch.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Fire the latch, waking every waiter.
    ///
    /// Returns `true` only for the call that performed the transition; later
    /// calls are no-ops.
    pub fn signal(&self) -> bool {
        let fired = self.tx.send_if_modified(|signaled| {
            if *signaled {
                false
            } else {
                *signaled = true;
                true
            }
        });

        if fired {
            tracing::info!("Termination requested");
        } else {
            tracing::debug!("Termination latch already signaled");
        }
        fired
    }

    /// Whether the latch has fired.
    pub fn is_signaled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Suspend until the latch fires. No timeout.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|signaled| *signaled).await;
    }
}

impl Default for TerminationLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Failure reported by a termination listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("termination listener {listener} failed: {reason}")]
pub struct TerminationError {
    pub listener: String,
    pub reason: String,
}

impl TerminationError {
    pub fn new(listener: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            listener: listener.into(),
            reason: reason.into(),
        }
    }
}

/// A subsystem that must be told when the process is shutting down.
pub trait TerminationListener: Send + Sync {
    /// Called exactly once, after the admin listener has stopped accepting.
    fn on_terminate(&self) -> Result<(), TerminationError>;
}

/// Something listeners can register with before it starts.
pub trait TerminationController {
    fn add_termination_listener(&mut self, listener: Arc<dyn TerminationListener>);
}
