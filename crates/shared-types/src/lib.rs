//! # Shared Types Crate
//!
//! Identifiers, ledger transaction model and error types shared by every
//! crate of the committee node.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Content Addressing**: Transaction ids are digests of their essence;
//!   a transaction is immutable once built or decoded.
//! - **Fixed-Size Identity**: `Address`, `Color` and `TransactionId` are
//!   32-byte newtypes with hex `Display`.

pub mod entities;
pub mod errors;
pub mod ledger;

pub use entities::*;
pub use errors::*;
pub use ledger::*;
