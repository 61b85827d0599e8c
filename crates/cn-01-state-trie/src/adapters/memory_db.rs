use crate::domain::{Hash, StoreError};
use crate::ports::TrieDatabase;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory `TrieDatabase`, keyed by node digest.
pub struct InMemoryTrieDb {
    nodes: RwLock<HashMap<Hash, Vec<u8>>>,
}

impl InMemoryTrieDb {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.read().map(|nodes| nodes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTrieDb {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieDatabase for InMemoryTrieDb {
    fn get_node(&self, hash: &Hash) -> Result<Option<Vec<u8>>, StoreError> {
        let nodes = self.nodes.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(nodes.get(hash).cloned())
    }

    fn put_node(&self, hash: Hash, data: Vec<u8>) -> Result<(), StoreError> {
        let mut nodes = self.nodes.write().map_err(|_| StoreError::LockPoisoned)?;
        nodes.insert(hash, data);
        Ok(())
    }

    fn batch_put(&self, batch: Vec<(Hash, Vec<u8>)>) -> Result<(), StoreError> {
        let mut nodes = self.nodes.write().map_err(|_| StoreError::LockPoisoned)?;
        nodes.extend(batch);
        Ok(())
    }

    fn delete_node(&self, hash: &Hash) -> Result<(), StoreError> {
        let mut nodes = self.nodes.write().map_err(|_| StoreError::LockPoisoned)?;
        nodes.remove(hash);
        Ok(())
    }
}
