//! In-memory store. Contents live as long as the process.

use dashmap::DashMap;
use std::sync::Arc;

use crate::storage::{KvStore, StorageError};

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.inner.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_operations() {
        let store = MemoryStore::new();
        assert!(store.get("a").is_none());

        store.set("a", "1".into()).unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));

        // Clones share the same map
        let other = store.clone();
        other.set("a", "2".into()).unwrap();
        assert_eq!(store.get("a").as_deref(), Some("2"));

        store.remove("a").unwrap();
        assert!(store.is_empty());
    }
}
