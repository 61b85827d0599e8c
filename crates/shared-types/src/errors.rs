//! # Error Types
//!
//! Defines error types used across subsystems.

use crate::entities::{Address, Color};
use thiserror::Error;

/// Errors parsing a fixed-size identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("Invalid identifier length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}

/// Errors encoding or decoding a ledger transaction.
#[derive(Debug, Clone, Error)]
pub enum TransactionError {
    /// The essence could not be (de)serialized.
    #[error("Transaction codec error: {0}")]
    Codec(String),

    /// More request blocks than a `u16` block index can address.
    #[error("Too many request blocks: {count}, max {max}")]
    TooManyRequests { count: usize, max: usize },
}

/// Structural reasons a transaction's blocks do not validate against a
/// committee address.
///
/// A final ledger transaction that fails these checks never becomes valid,
/// so callers drop it instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockValidationError {
    #[error("Request block {index} targets the zero address")]
    ZeroTarget { index: u16 },

    #[error("Request block {index} payload is {size} bytes, max {max}")]
    PayloadTooLarge { index: u16, size: usize, max: usize },

    #[error("State block uses the base color")]
    BaseColorState,

    #[error("Address {address} holds {held} state tokens, expected exactly one")]
    StateTokenNotUnique { address: Address, held: i64 },

    #[error("Address {address} receives {requests} requests but only {minted} request tokens")]
    MissingRequestTokens {
        address: Address,
        requests: usize,
        minted: i64,
    },

    #[error("Balance of color {color} at {address} overflows")]
    BalanceOverflow { address: Address, color: Color },
}
