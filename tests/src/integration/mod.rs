//! # Integration Flows
//!
//! - `anchored_state` - a committee's store digest travels through a state
//!   block and the dispatcher, then proofs are checked against it
//! - `concurrent_dispatch` - the dispatch service under concurrent load
//! - `feed` - publisher feeds through the node's feed monitor

pub mod anchored_state;
pub mod concurrent_dispatch;
pub mod feed;
