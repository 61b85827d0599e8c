//! # State Proofs
//!
//! A proof is the list of encoded nodes on the path from the root towards a
//! key. It shows either the value stored under the key (inclusion) or the
//! node where the key's path leaves the trie (exclusion).
//!
//! ## Verification
//!
//! Strictly iterative: the walk consumes one node per step and is bounded by
//! `MAX_PROOF_DEPTH`, so a hostile proof cannot exhaust the stack.

use super::codec::EncodedNode;
use super::nibbles::Nibbles;
use super::trie::MAX_TRIE_DEPTH;
use super::{keccak256, Hash, VerifyError, EMPTY_TRIE_ROOT};
use serde::{Deserialize, Serialize};

/// Maximum number of nodes accepted in a proof.
pub const MAX_PROOF_DEPTH: usize = MAX_TRIE_DEPTH;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateProof {
    pub key: Vec<u8>,
    /// Claimed value; `None` for an exclusion proof.
    pub value: Option<Vec<u8>>,
    /// Encoded trie nodes, root first.
    pub nodes: Vec<Vec<u8>>,
    /// Root digest the proof was generated against.
    pub root: Hash,
}

impl StateProof {
    pub fn is_exclusion(&self) -> bool {
        self.value.is_none()
    }

    /// Check the proof against `root` and the claimed value.
    pub fn verify(&self, root: &Hash) -> Result<(), VerifyError> {
        let proven = verify_proof(root, &self.key, &self.nodes)?;
        if proven != self.value {
            return Err(VerifyError::ValueMismatch);
        }
        Ok(())
    }
}

/// Walk `nodes` from `root` along `key` and return the proven value.
///
/// `Ok(None)` proves that `key` is absent under `root`.
pub fn verify_proof(
    root: &Hash,
    key: &[u8],
    nodes: &[Vec<u8>],
) -> Result<Option<Vec<u8>>, VerifyError> {
    if nodes.len() > MAX_PROOF_DEPTH {
        return Err(VerifyError::ProofTooDeep {
            depth: nodes.len(),
            max: MAX_PROOF_DEPTH,
        });
    }
    if nodes.is_empty() {
        return if *root == EMPTY_TRIE_ROOT {
            Ok(None)
        } else {
            Err(VerifyError::EmptyProof)
        };
    }

    let nibbles = Nibbles::from_bytes(key);
    let mut remaining = nibbles.as_slice();
    let mut expected = *root;

    for (depth, raw) in nodes.iter().enumerate() {
        if keccak256(raw) != expected {
            return Err(VerifyError::HashMismatch { depth });
        }

        let outcome = match EncodedNode::decode(raw)? {
            EncodedNode::Leaf { path, value } => {
                Some((path.as_slice() == remaining).then_some(value))
            }
            EncodedNode::Extension { path, child } => {
                match remaining.strip_prefix(path.as_slice()) {
                    Some(rest) => {
                        remaining = rest;
                        expected = child;
                        None
                    }
                    None => Some(None),
                }
            }
            EncodedNode::Branch { children, value } => match remaining.split_first() {
                None => Some(value),
                Some((first, rest)) => match children[*first as usize] {
                    Some(child) => {
                        remaining = rest;
                        expected = child;
                        None
                    }
                    None => Some(None),
                },
            },
        };

        if let Some(proven) = outcome {
            if depth + 1 != nodes.len() {
                return Err(VerifyError::TrailingNodes { depth });
            }
            return Ok(proven);
        }
    }

    Err(VerifyError::IncompleteProof)
}
