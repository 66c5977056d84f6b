//! Single-holder admission latch for the admin channel.

use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one admin connection at a time.
///
/// Acquisition is a single compare-and-swap and never waits; a second
/// operator is refused, not queued.
#[derive(Debug, Default)]
pub struct ConnectionGate {
    held: AtomicBool,
}

impl ConnectionGate {
    /// Create a free gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate if it is free. Never blocks.
    pub fn try_acquire(&self) -> bool {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Free the gate. Safe to call when nothing holds it.
    pub fn release(&self) {
        tracing::info!("Releasing admin connection slot");
        if self.held.swap(false, Ordering::AcqRel) {
            tracing::info!("Admin connection slot released");
        } else {
            tracing::warn!("Admin connection slot released while already free");
        }
    }

    /// Whether a connection currently holds the gate.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}
