//! # Domain Module
//!
//! Core domain types for transaction dispatch.

pub mod config;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod stats;
pub mod value_objects;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use stats::*;
pub use value_objects::*;
