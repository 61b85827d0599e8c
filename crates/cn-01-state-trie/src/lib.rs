//! # cn-01-state-trie
//!
//! Authenticated key-value state for contract execution.
//!
//! ## Role in System
//!
//! - **Contract state**: `get`/`set`/`del`/`has`/`iterate` over opaque byte keys
//! - **Commitment**: `root_hash()` anchors the state in the next state block
//! - **Proofs**: light verification of single keys against a root
//!
//! ## Stores
//!
//! - `PatriciaTrie`: incremental Merkle-Patricia trie; a write rehashes only
//!   the path to the root
//! - `FlatStore`: ordered map hashed in full on every `root_hash()`
//!
//! Both produce a digest that depends only on the stored pairs. Equal
//! content gives equal digests within one implementation; the two
//! implementations use different commitments.
//!
//! ```text
//! [Contract VM] ──get/set/del──→ [AuthenticatedStore] ──root_hash──→ [StateBlock]
//!                                        │
//!                                  commit/load
//!                                        ↓
//!                                 [TrieDatabase]
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
