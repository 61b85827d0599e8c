pub mod codec;
pub mod errors;
pub mod flat;
pub mod nibbles;
pub mod node;
pub mod partition;
pub mod proofs;
pub mod trie;

pub use codec::EncodedNode;
pub use errors::*;
pub use flat::FlatStore;
pub use nibbles::Nibbles;
pub use partition::Partition;
pub use proofs::*;
pub use trie::*;

pub use shared_types::{keccak256, Hash, EMPTY_TRIE_ROOT};
