//! In-process counter store.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::store::CounterStore;

/// Counter store kept in process memory.
///
/// Clones share the same underlying map. The store can be switched offline to
/// exercise the `Unavailable` paths of its callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryCounterStore {
    values: Arc<DashMap<String, i64>>,
    offline: Arc<AtomicBool>,
    operations: Arc<AtomicU64>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing (or regaining) the connection to the store.
    pub fn set_reachable(&self, reachable: bool) {
        self.offline.store(!reachable, Ordering::SeqCst);
    }

    /// Number of operations issued against the store, including failed ones.
    pub fn operation_count(&self) -> u64 {
        self.operations.load(Ordering::SeqCst)
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("memory store is offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        self.begin()?;
        Ok(self.values.get(key).map(|v| *v))
    }

    async fn set(&self, key: &str, value: i64) -> Result<(), StoreError> {
        self.begin()?;
        self.values.insert(key.to_owned(), value);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<i64>,
        new: i64,
    ) -> Result<bool, StoreError> {
        self.begin()?;
        let swapped = match self.values.entry(key.to_owned()) {
            Entry::Occupied(mut entry) => {
                if Some(*entry.get()) == expected {
                    entry.insert(new);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                if expected.is_none() {
                    entry.insert(new);
                    true
                } else {
                    false
                }
            }
        };
        Ok(swapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_key_reads_as_none() {
        let store = MemoryCounterStore::new();
        assert_eq!(store.get("item.1").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn set_then_get() {
        let store = MemoryCounterStore::new();
        store.set("available_seats", 50).await.unwrap();
        assert_eq!(store.get("available_seats").await.unwrap(), Some(50));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn compare_and_set_respects_expected_value() {
        let store = MemoryCounterStore::new();

        assert!(store.compare_and_set("item.1", None, 1).await.unwrap());
        assert!(!store.compare_and_set("item.1", None, 5).await.unwrap());
        assert!(!store.compare_and_set("item.1", Some(0), 5).await.unwrap());
        assert!(store.compare_and_set("item.1", Some(1), 2).await.unwrap());

        assert_eq!(store.get("item.1").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn offline_store_fails_every_operation() {
        let store = MemoryCounterStore::new();
        store.set_reachable(false);

        assert!(matches!(
            store.get("item.1").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.set("item.1", 1).await.is_err());
        assert!(store.compare_and_set("item.1", None, 1).await.is_err());
        assert_eq!(store.operation_count(), 3);

        store.set_reachable(true);
        assert!(store.set("item.1", 1).await.is_ok());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryCounterStore::new();
        let other = store.clone();
        other.set("item.2", 7).await.unwrap();
        assert_eq!(store.get("item.2").await.unwrap(), Some(7));
    }
}
