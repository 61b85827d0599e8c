use crate::domain::{Hash, StoreError};

/// Content-addressed node storage: every node is stored under its digest.
pub trait TrieDatabase: Send + Sync {
    fn get_node(&self, hash: &Hash) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_node(&self, hash: Hash, data: Vec<u8>) -> Result<(), StoreError>;
    fn batch_put(&self, nodes: Vec<(Hash, Vec<u8>)>) -> Result<(), StoreError>;
    fn delete_node(&self, hash: &Hash) -> Result<(), StoreError>;
}
