use super::Hash;
use thiserror::Error;

/// Errors decoding a serialized trie node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Truncated node: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Unknown node tag: {0:#04x}")]
    UnknownTag(u8),

    #[error("Invalid nibble value: {0}")]
    InvalidNibble(u8),

    #[error("Invalid value flag: {0}")]
    InvalidFlag(u8),

    #[error("Trailing bytes after node: {0}")]
    TrailingBytes(usize),
}

/// Errors from the persistence side of the trie.
///
/// The key-value surface (`get`/`set`/`del`/`has`) never fails; only
/// loading from and committing to a `TrieDatabase` can.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing trie node {}", hex::encode(.hash))]
    MissingNode { hash: Hash },

    #[error("Corrupt trie node {}: {reason}", hex::encode(.hash))]
    CorruptNode { hash: Hash, reason: String },

    #[error("Trie depth exceeded: max {max}")]
    TrieDepthExceeded { max: usize },

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Errors verifying a state proof against a root digest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("Proof too deep: {depth} nodes, max {max}")]
    ProofTooDeep { depth: usize, max: usize },

    #[error("Empty proof for a non-empty root")]
    EmptyProof,

    #[error("Hash mismatch at proof depth {depth}")]
    HashMismatch { depth: usize },

    #[error("Invalid proof node: {0}")]
    InvalidNode(#[from] CodecError),

    #[error("Proof continues past its terminal node at depth {depth}")]
    TrailingNodes { depth: usize },

    #[error("Proof ends before reaching the key")]
    IncompleteProof,

    #[error("Proven value differs from the claimed value")]
    ValueMismatch,
}
