//! # Domain Value Objects
//!
//! Results of a single dispatch.

use super::errors::RejectReason;
use shared_types::Address;
use std::fmt;

/// Result of dispatching one ledger event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// This many messages were enqueued on the committee inbox.
    Delivered(usize),
    /// The event does not concern any committee on this node.
    NotApplicable(NotApplicable),
    /// The event is malformed and was dropped.
    Rejected(RejectReason),
}

impl DispatchOutcome {
    /// Number of messages enqueued.
    pub fn delivered(&self) -> usize {
        match self {
            Self::Delivered(n) => *n,
            _ => 0,
        }
    }

    /// Check if the outcome is a rejection.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl From<NotApplicable> for DispatchOutcome {
    fn from(reason: NotApplicable) -> Self {
        Self::NotApplicable(reason)
    }
}

impl From<RejectReason> for DispatchOutcome {
    fn from(reason: RejectReason) -> Self {
        Self::Rejected(reason)
    }
}

/// Why an event was ignored. Not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotApplicable {
    /// The transaction carries no state block.
    NoStateBlock,
    /// No output holds exactly one token of the state color.
    NoStateAnchor,
    /// No committee for this address runs on this node.
    UnknownCommittee(Address),
    /// The transaction neither anchors the committee state nor carries
    /// requests for it.
    NothingToDeliver,
}

impl fmt::Display for NotApplicable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStateBlock => write!(f, "no state block"),
            Self::NoStateAnchor => write!(f, "no state anchor output"),
            Self::UnknownCommittee(addr) => write!(f, "unknown committee {}", addr),
            Self::NothingToDeliver => write!(f, "nothing to deliver"),
        }
    }
}
