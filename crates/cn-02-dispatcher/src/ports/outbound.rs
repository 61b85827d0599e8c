//! # Outbound Ports
//!
//! Collaborators the dispatcher drives: the committee registry and the
//! committee inboxes.

use crate::domain::CommitteeMessage;
use parking_lot::Mutex;
use shared_types::Address;
use std::sync::Arc;

/// Lookup of the committees running on this node.
///
/// Called concurrently from every dispatch; implementations must stay
/// consistent while membership changes.
pub trait CommitteeRegistry: Send + Sync {
    /// Inbox of the committee for `address`, if this node runs one.
    fn committee_by_address(&self, address: &Address) -> Option<Arc<dyn CommitteeInbox>>;
}

/// Message intake of one committee.
pub trait CommitteeInbox: Send + Sync {
    /// Address of the committee.
    fn address(&self) -> Address;

    /// Accept one message without blocking.
    ///
    /// Messages enqueued by one caller are delivered in enqueue order.
    fn enqueue(&self, message: CommitteeMessage);
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Inbox that records every message it receives.
#[derive(Debug)]
pub struct RecordingInbox {
    address: Address,
    messages: Mutex<Vec<CommitteeMessage>>,
}

impl RecordingInbox {
    /// Create an empty inbox for `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Messages received so far, in arrival order.
    pub fn messages(&self) -> Vec<CommitteeMessage> {
        self.messages.lock().clone()
    }

    /// Remove and return the received messages.
    pub fn drain(&self) -> Vec<CommitteeMessage> {
        std::mem::take(&mut *self.messages.lock())
    }

    /// Number of messages received.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Check if nothing was received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CommitteeInbox for RecordingInbox {
    fn address(&self) -> Address {
        self.address
    }

    fn enqueue(&self, message: CommitteeMessage) {
        self.messages.lock().push(message);
    }
}
