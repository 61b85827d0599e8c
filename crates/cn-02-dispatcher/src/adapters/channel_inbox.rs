//! Channel Inbox Adapter
//!
//! Implements `CommitteeInbox` on an unbounded tokio channel. The committee
//! owns the receiving end.

use crate::domain::CommitteeMessage;
use crate::ports::outbound::CommitteeInbox;
use shared_types::Address;
use tokio::sync::mpsc;
use tracing::warn;

/// Inbox that never blocks the sender.
pub struct ChannelInbox {
    address: Address,
    sender: mpsc::UnboundedSender<CommitteeMessage>,
}

impl ChannelInbox {
    /// Create an inbox for `address` and the receiver the committee drains.
    pub fn new(address: Address) -> (Self, mpsc::UnboundedReceiver<CommitteeMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { address, sender }, receiver)
    }

    /// Check if the committee has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl CommitteeInbox for ChannelInbox {
    fn address(&self) -> Address {
        self.address
    }

    fn enqueue(&self, message: CommitteeMessage) {
        let kind = message.kind();
        if self.sender.send(message).is_err() {
            warn!(addr = %self.address, kind, "Committee inbox closed, message dropped");
        }
    }
}
