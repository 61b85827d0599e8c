//! # Flat Store
//!
//! Ordered map with a commitment computed over the whole content.
//!
//! ## Algorithm
//!
//! `root_hash` walks every pair in ascending key order and feeds
//! `len(key) | key | len(value) | value` into Keccak-256. Lengths are u32
//! big-endian; the framing makes `("ab", "c")` and `("a", "bc")` distinct.
//!
//! Writes are O(log n), `root_hash` is O(n). Use `PatriciaTrie` when the
//! digest is read after every batch of writes.

use super::{Hash, EMPTY_TRIE_ROOT};
use crate::ports::{AuthenticatedStore, KvIter, KvReader, KvWriter};
use sha3::{Digest, Keccak256};
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlatStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl FlatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_hash(&self) -> Hash {
        if self.data.is_empty() {
            return EMPTY_TRIE_ROOT;
        }
        let mut hasher = Keccak256::new();
        for (key, value) in &self.data {
            hasher.update((key.len() as u32).to_be_bytes());
            hasher.update(key);
            hasher.update((value.len() as u32).to_be_bytes());
            hasher.update(value);
        }
        hasher.finalize().into()
    }
}

impl KvReader for FlatStore {
    fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }

    fn iter_prefix<'a>(&'a self, prefix: &[u8]) -> KvIter<'a> {
        let owned = prefix.to_vec();
        let range = self
            .data
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded));
        Box::new(
            range
                .take_while(move |(k, _)| k.starts_with(&owned))
                .map(|(k, v)| (k.clone(), v.as_slice())),
        )
    }
}

impl KvWriter for FlatStore {
    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.data.insert(key.to_vec(), value.to_vec());
    }

    fn del(&mut self, key: &[u8]) {
        self.data.remove(key);
    }
}

impl AuthenticatedStore for FlatStore {
    fn root_hash(&self) -> Hash {
        FlatStore::root_hash(self)
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

impl<K: AsRef<[u8]>, V: AsRef<[u8]>> FromIterator<(K, V)> for FlatStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let data = iter
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_vec(), v.as_ref().to_vec()))
            .collect();
        Self { data }
    }
}
