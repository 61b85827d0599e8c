//! # Dispatch Statistics
//!
//! Lock-free counters shared by all concurrent dispatches.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use super::value_objects::DispatchOutcome;

/// Counters updated once per dispatched event.
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Events handled.
    pub events: AtomicU64,
    /// Messages enqueued on committee inboxes.
    pub messages_delivered: AtomicU64,
    /// Events that did not concern this node.
    pub not_applicable: AtomicU64,
    /// Events dropped as malformed.
    pub rejected: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStatsSnapshot {
    /// Events handled.
    pub events: u64,
    /// Messages enqueued on committee inboxes.
    pub messages_delivered: u64,
    /// Events that did not concern this node.
    pub not_applicable: u64,
    /// Events dropped as malformed.
    pub rejected: u64,
}

impl DispatchStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one event.
    pub fn record(&self, outcome: &DispatchOutcome) {
        self.events.fetch_add(1, Ordering::Relaxed);
        match outcome {
            DispatchOutcome::Delivered(n) => {
                self.messages_delivered
                    .fetch_add(*n as u64, Ordering::Relaxed);
            }
            DispatchOutcome::NotApplicable(_) => {
                self.not_applicable.fetch_add(1, Ordering::Relaxed);
            }
            DispatchOutcome::Rejected(_) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Read all counters.
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            events: self.events.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            not_applicable: self.not_applicable.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}
