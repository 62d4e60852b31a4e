//! # Refresh Signal
//!
//! A coalescing wake-up shared between the listener's tasks and the view's
//! refresh loop. Any number of triggers before the loop wakes collapse into
//! a single wake-up.
//!
//! Every trigger is stamped with the generation it was issued under. Moving
//! to a new identity advances the generation, so late triggers from the
//! previous identity's tasks are discarded. A wake-up stored before the
//! generation moved on is discarded as well.

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Notify;
use tracing::trace;

/// Coalescing refresh trigger.
#[derive(Debug, Default)]
pub struct RefreshSignal {
    notify: Notify,
    generation: AtomicU64,
    /// Newest generation that stored a wake-up.
    woken: AtomicU64,
    accepted: AtomicU64,
}

impl RefreshSignal {
    /// Create a signal at generation 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a new generation and return it.
    pub fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Request a refresh on behalf of `generation`.
    ///
    /// Returns false, and does nothing, if the generation is stale.
    pub fn trigger(&self, generation: u64) -> bool {
        if generation != self.generation() {
            trace!(generation, "Stale refresh trigger dropped");
            return false;
        }
        self.accepted.fetch_add(1, Ordering::Relaxed);
        self.woken.fetch_max(generation, Ordering::SeqCst);
        // At most one permit is stored, so pending triggers coalesce.
        self.notify.notify_one();
        true
    }

    /// Wait for the next (coalesced) trigger of the current generation.
    pub async fn notified(&self) {
        loop {
            self.notify.notified().await;
            let woken = self.woken.load(Ordering::SeqCst);
            if woken == self.generation() {
                return;
            }
            trace!(woken, "Wake-up from a previous generation skipped");
        }
    }

    /// Total triggers accepted so far, before coalescing.
    #[must_use]
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }
}
