use crate::ports::{KvIter, KvReader, KvWriter};
use shared_types::Address;

/// A contract's private key space inside a shared store.
///
/// Every key is stored as `prefix | key`. Reads, writes and iteration are
/// relative to the partition; keys outside it are invisible.
pub struct Partition<'s, S: ?Sized> {
    store: &'s mut S,
    prefix: Vec<u8>,
}

impl<'s, S: ?Sized> Partition<'s, S> {
    pub fn new(store: &'s mut S, prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Partition keyed by a contract address.
    pub fn for_address(store: &'s mut S, address: &Address) -> Self {
        Self::new(store, address.as_bytes().to_vec())
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.prefix.len() + key.len());
        full.extend_from_slice(&self.prefix);
        full.extend_from_slice(key);
        full
    }
}

impl<S: KvReader + ?Sized> KvReader for Partition<'_, S> {
    fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.store.get(&self.full_key(key))
    }

    fn iter_prefix<'a>(&'a self, prefix: &[u8]) -> KvIter<'a> {
        let strip = self.prefix.len();
        Box::new(
            self.store
                .iter_prefix(&self.full_key(prefix))
                .map(move |(key, value)| (key[strip..].to_vec(), value)),
        )
    }
}

impl<S: KvWriter + ?Sized> KvWriter for Partition<'_, S> {
    fn set(&mut self, key: &[u8], value: &[u8]) {
        let full = self.full_key(key);
        self.store.set(&full, value);
    }

    fn del(&mut self, key: &[u8]) {
        let full = self.full_key(key);
        self.store.del(&full);
    }
}
