//! # Domain Errors
//!
//! Reasons a dispatch is refused, and failures of the dispatch service.

use shared_types::{BlockValidationError, TransactionId};
use thiserror::Error;

/// Malformed input from the already-final ledger.
///
/// Logged and dropped, never retried: a final transaction that fails these
/// checks will never become valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The balance snapshot does not contain the transaction being dispatched.
    #[error("Transaction {0} is not among the provided outputs")]
    MissingBalances(TransactionId),

    /// Structural validation of the state or request blocks failed.
    #[error("Invalid blocks: {0}")]
    InvalidBlocks(#[from] BlockValidationError),
}

/// Dispatch service errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The service has stopped and no longer accepts events.
    #[error("Dispatch service stopped")]
    ServiceStopped,

    /// Configuration rejected at startup.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
