//! Session store trait and the in-memory backend.

use dashmap::DashMap;

/// Errors surfaced by store operations.
///
/// The in-memory backend never fails, but the trait leaves room for
/// persistent implementations that can.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying backend failure.
    #[error("store backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

/// Keyed map from session identifier to session record.
///
/// Pure key-value operations. Callers own all invariants; the store enforces
/// nothing beyond key uniqueness. Implementors must be `Send + Sync` because
/// the orchestrator and engine share one store across session tasks.
pub trait SessionStore<T: Clone>: Send + Sync {
    /// Fetch a record by key.
    fn get(&self, key: &str) -> Result<Option<T>, StoreError>;

    /// Insert or replace a record.
    fn put(&self, key: &str, value: T) -> Result<(), StoreError>;

    /// Remove a record. Removing an absent key is a no-op.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Number of stored records.
    fn len(&self) -> usize;

    /// Whether the store holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store over a concurrent hash map.
pub struct MemoryStore<T: Clone> {
    records: DashMap<String, T>,
}

impl<T: Clone> MemoryStore<T> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// All stored keys (unordered).
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.records.iter().map(|e| e.key().clone()).collect()
    }
}

impl<T: Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> SessionStore<T> for MemoryStore<T> {
    fn get(&self, key: &str) -> Result<Option<T>, StoreError> {
        Ok(self.records.get(key).map(|e| e.value().clone()))
    }

    fn put(&self, key: &str, value: T) -> Result<(), StoreError> {
        let _ = self.records.insert(key.to_owned(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _ = self.records.remove(key);
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_returns_none() {
        let store: MemoryStore<String> = MemoryStore::new();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn put_then_get() {
        let store = MemoryStore::new();
        store.put("k1", "v1".to_owned()).unwrap();
        assert_eq!(store.get("k1").unwrap().as_deref(), Some("v1"));
    }

    #[test]
    fn put_replaces_existing() {
        let store = MemoryStore::new();
        store.put("k1", "old".to_owned()).unwrap();
        store.put("k1", "new".to_owned()).unwrap();
        assert_eq!(store.get("k1").unwrap().as_deref(), Some("new"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_removes() {
        let store = MemoryStore::new();
        store.put("k1", 42u32).unwrap();
        store.delete("k1").unwrap();
        assert!(store.get("k1").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn delete_missing_is_noop() {
        let store: MemoryStore<u32> = MemoryStore::new();
        store.delete("never-existed").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn keys_lists_all() {
        let store = MemoryStore::new();
        store.put("a", 1u32).unwrap();
        store.put("b", 2u32).unwrap();
        let mut keys = store.keys();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn store_is_object_safe() {
        let store: Box<dyn SessionStore<u32>> = Box::new(MemoryStore::new());
        store.put("k", 1).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(1));
    }

    #[tokio::test]
    async fn concurrent_puts_from_tasks() {
        use std::sync::Arc;
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..16u32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.put(&format!("k{i}"), i).unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.len(), 16);
    }
}
