//! # Ports Layer (Hexagonal Architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::DispatchApi;
pub use outbound::{CommitteeInbox, CommitteeRegistry, RecordingInbox};
