//! # CN-02 Dispatcher
//!
//! Routes ledger transactions to the committees running on this node.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Every confirmed ledger transaction and every balance change of a
//! committee address arrives as a [`LedgerEvent`]. The dispatcher:
//! - resolves the committee owning the state anchor or the address,
//! - validates the transaction blocks against that committee,
//! - enqueues typed [`CommitteeMessage`]s on the committee inbox.
//!
//! Events that concern no local committee are dropped silently; malformed
//! events are logged and dropped, never retried.
//!
//! ## Module Structure
//!
//! ```text
//! cn-02-dispatcher/
//! ├── domain/          # Messages, outcomes, counters, config
//! ├── ports/           # DispatchApi + CommitteeRegistry / CommitteeInbox
//! ├── adapters/        # In-memory registry, channel inbox
//! └── service/         # Dispatcher (router) + DispatchService (event loop)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{ChannelInbox, InMemoryCommitteeRegistry};
pub use domain::{
    invariant_causal_order, CommitteeMessage, DispatchConfig, DispatchError, DispatchOutcome,
    DispatchStats, DispatchStatsSnapshot, LedgerEvent, NotApplicable, RejectReason,
};
pub use ports::{CommitteeInbox, CommitteeRegistry, DispatchApi, RecordingInbox};
pub use service::{DispatchHandle, DispatchService, Dispatcher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
