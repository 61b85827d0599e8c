//! # Wiring
//!
//! Tasks connecting the node services to the outside:
//!
//! - `committees` - one inbox and consumer per configured committee
//! - `feed` - publisher subscription, logging and ledger event forwarding
//! - `ledger_feed` - decoding of ledger events carried on the feed

pub mod committees;
pub mod feed;
pub mod ledger_feed;

pub use committees::start_committees;
pub use feed::FeedMonitor;
pub use ledger_feed::{encode_transaction, parse_ledger_event, LedgerFeedError};
