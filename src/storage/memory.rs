//! In-memory storage backend
//!
//! HashMap behind a reader/writer lock. Contents live for the process
//! lifetime; nothing is persisted.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::Storage;
use crate::error::StorageError;

/// Map-backed storage
pub struct MemoryStorage {
    map: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.map.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.map.read().get(key).cloned())
    }
}
