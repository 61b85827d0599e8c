//! # Committee Node Runtime Library
//!
//! Exposes the node services for the `node-runtime` binary and for tests.
//!
//! ## Structure
//!
//! - `container/` - configuration and the service container
//! - `wiring/` - committee consumers and the publisher feed monitor
//!
//! ## Data Flow
//!
//! ```text
//! ledger events ──→ DispatchService ──→ Dispatcher ──→ committee inboxes
//!                                                            │
//!                                                            ↓
//!                                                   committee consumers
//!
//! publishers ──→ FeedMonitor ──→ ledger_* topics decoded ──→ DispatchHandle
//!                     │
//!                     └──→ other topics logged
//! ```

#![warn(missing_docs)]

pub mod container;
pub mod wiring;

pub use container::{load_config, ConfigError, NodeConfig, NodeContainer};
pub use wiring::{encode_transaction, parse_ledger_event, start_committees, FeedMonitor, LedgerFeedError};
