//! # Feed Subscriber - Ledger Feed Fan-In
//!
//! Topic-filtered subscription to line-oriented publishers.
//!
//! ## Protocol
//!
//! A publisher accepts TCP connections and writes one message per line.
//! Fields are separated by a single space; the first field is the topic.
//! Filtering happens on the subscriber side.
//!
//! ```text
//! ┌─────────────┐
//! │ Publisher A │──┐
//! └─────────────┘  │  lines     ┌──────────────┐    HostMessage
//!                  ├──────────→ │ subscribe_*  │ ─────────────────→ consumer
//! ┌─────────────┐  │            └──────────────┘
//! │ Publisher B │──┘                   ↑
//! └─────────────┘                  shutdown (watch)
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::time::Duration;

pub mod subscriber;
pub mod topics;

// Re-export main types
pub use subscriber::{subscribe, subscribe_multi, HostMessage, SubscribeError};
pub use topics::{split_message, TopicFilter, FIELD_SEPARATOR};

/// Delay between dial attempts when retrying.
pub const RETRY_INTERVAL: Duration = Duration::from_millis(200);

/// Messages buffered per subscription before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Longest line accepted from a publisher, in bytes. Longer lines are
/// dropped whole.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;
