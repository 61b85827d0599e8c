//! # Core Domain Entities
//!
//! Fixed-size identifiers and value types shared by the state store, the
//! dispatcher and the node runtime.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `Color`, `TransactionId`, `RequestId`
//! - **Value**: `Balance`, `AddressBalances`
//! - **Commitment**: `Hash`, `EMPTY_TRIE_ROOT`

use crate::errors::IdentifierError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CLUSTER A: COMMITMENT
// =============================================================================

/// A 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// Length in bytes of every fixed-size identifier in this crate.
pub const ID_LENGTH: usize = 32;

/// Digest of an empty authenticated store: `keccak256(0x80)`.
pub const EMPTY_TRIE_ROOT: Hash = [
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
];

/// Compute Keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Transport encoding of a digest (lower-case hex).
pub fn hash_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

// =============================================================================
// CLUSTER B: IDENTITY
// =============================================================================

macro_rules! fixed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        pub struct $name(pub [u8; ID_LENGTH]);

        impl $name {
            /// Wrap raw bytes.
            pub const fn new(bytes: [u8; ID_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Parse from a slice of exactly `ID_LENGTH` bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentifierError> {
                let raw: [u8; ID_LENGTH] =
                    bytes
                        .try_into()
                        .map_err(|_| IdentifierError::InvalidLength {
                            expected: ID_LENGTH,
                            actual: bytes.len(),
                        })?;
                Ok(Self(raw))
            }

            /// Parse from the hex form produced by `Display`.
            pub fn from_hex(s: &str) -> Result<Self, IdentifierError> {
                let bytes =
                    hex::decode(s).map_err(|e| IdentifierError::InvalidHex(e.to_string()))?;
                Self::from_slice(&bytes)
            }

            pub fn as_bytes(&self) -> &[u8; ID_LENGTH] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl From<[u8; ID_LENGTH]> for $name {
            fn from(bytes: [u8; ID_LENGTH]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({}..)"), hex::encode(&self.0[..4]))
            }
        }
    };
}

fixed_id!(
    /// Identifier of an on-ledger account or of a committee.
    Address
);

fixed_id!(
    /// Token-type tag distinguishing fungible asset classes on an output.
    Color
);

fixed_id!(
    /// Identifier of a ledger transaction (digest of its essence).
    TransactionId
);

impl Color {
    /// The base token color.
    pub const IOTA: Color = Color([0u8; ID_LENGTH]);

    /// Marks tokens minted by the transaction that carries them.
    pub const NEW: Color = Color([0xFFu8; ID_LENGTH]);
}

/// Identifies one request block within a transaction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId {
    /// Transaction carrying the request block.
    pub tx_id: TransactionId,
    /// Position of the request block in the transaction.
    pub index: u16,
}

impl RequestId {
    pub fn new(tx_id: TransactionId, index: u16) -> Self {
        Self { tx_id, index }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.tx_id, self.index)
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({:?}[{}])", self.tx_id, self.index)
    }
}

// =============================================================================
// CLUSTER C: VALUE
// =============================================================================

/// Amount of tokens of one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub color: Color,
    pub value: i64,
}

impl Balance {
    pub fn new(color: Color, value: i64) -> Self {
        Self { color, value }
    }
}

/// Balance snapshot of one address: outputs grouped by the transaction that
/// created them.
pub type AddressBalances = BTreeMap<TransactionId, Vec<Balance>>;

/// Sum of all balances of `color`, `None` if the sum overflows `i64`.
pub fn balance_of_color(balances: &[Balance], color: &Color) -> Option<i64> {
    balances
        .iter()
        .filter(|b| b.color == *color)
        .try_fold(0i64, |acc, b| acc.checked_add(b.value))
}
