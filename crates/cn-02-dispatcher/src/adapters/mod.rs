//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-process implementations of the outbound ports.

mod channel_inbox;
mod registry;

pub use channel_inbox::ChannelInbox;
pub use registry::InMemoryCommitteeRegistry;
