//! # Service Layer
//!
//! The router and the event loop that drives it.

pub mod router;
pub mod runner;

pub use router::Dispatcher;
pub use runner::{DispatchHandle, DispatchService};
