use crate::domain::Hash;

/// Lazy sequence of `(key, value)` pairs in ascending key order.
pub type KvIter<'a> = Box<dyn Iterator<Item = (Vec<u8>, &'a [u8])> + 'a>;

/// Read side of a key-value store.
///
/// Reads never fail: the store lives in process memory. An empty value is a
/// present value, distinct from `None`.
pub trait KvReader {
    fn get(&self, key: &[u8]) -> Option<&[u8]>;

    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Pairs whose key starts with `prefix`, ascending byte order.
    ///
    /// Each call starts a fresh traversal.
    fn iter_prefix<'a>(&'a self, prefix: &[u8]) -> KvIter<'a>;

    /// Visit pairs under `prefix` until `visit` returns `false`.
    ///
    /// Returns `false` if the visit was stopped early.
    fn iterate(&self, prefix: &[u8], visit: &mut dyn FnMut(&[u8], &[u8]) -> bool) -> bool {
        for (key, value) in self.iter_prefix(prefix) {
            if !visit(&key, value) {
                return false;
            }
        }
        true
    }
}

/// Write side of a key-value store. Writes succeed unconditionally.
pub trait KvWriter {
    /// Insert or overwrite.
    fn set(&mut self, key: &[u8], value: &[u8]);

    /// Remove; deleting an absent key is a no-op.
    fn del(&mut self, key: &[u8]);
}

/// Key-value store with a cryptographic commitment to its whole content.
///
/// `root_hash` depends only on the current set of pairs, never on the order
/// of the mutations that produced it, and changes whenever any key or value
/// changes.
///
/// No internal synchronization: a store is owned by one execution context
/// at a time.
pub trait AuthenticatedStore: KvReader + KvWriter {
    fn root_hash(&self) -> Hash;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
