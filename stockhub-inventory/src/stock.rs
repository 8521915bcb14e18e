//! Per-item reserved-stock ledger.

use std::fmt;
use std::sync::Arc;

use stockhub_counter_store::CounterStore;
use tracing::{debug, info};

use crate::catalog::{Item, ItemId, ProductAvailability};
use crate::error::InventoryError;
use crate::{CommitOutcome, MAX_COMMIT_ATTEMPTS};

/// Tracks how many units of each item are already committed.
///
/// The stored value counts up from 0 towards the item's initial quantity.
#[derive(Clone)]
pub struct StockLedger {
    store: Arc<dyn CounterStore>,
}

impl fmt::Debug for StockLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StockLedger")
            .field("store", &"<dyn CounterStore>")
            .finish()
    }
}

impl StockLedger {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Store key holding the reserved count of an item.
    #[inline]
    pub fn key(item_id: ItemId) -> String {
        format!("item.{item_id}")
    }

    /// Units of `item_id` already reserved. An absent key counts as 0.
    pub async fn get_reserved(&self, item_id: ItemId) -> Result<i64, InventoryError> {
        let reserved = self.store.get(&Self::key(item_id)).await?;
        Ok(reserved.unwrap_or(0))
    }

    /// Write `current_reserved + 1` for the item.
    ///
    /// The caller supplies the value it just read, so a get followed by this
    /// call is not linearizable. Use [`StockLedger::try_commit`] when
    /// concurrent writers are possible.
    pub async fn reserve(&self, item_id: ItemId, current_reserved: i64) -> Result<(), InventoryError> {
        self.store
            .set(&Self::key(item_id), current_reserved + 1)
            .await?;
        Ok(())
    }

    /// Units still available: initial quantity minus reserved.
    pub async fn available_quantity(&self, item: &Item) -> Result<i64, InventoryError> {
        let reserved = self.get_reserved(item.item_id).await?;
        Ok(item.capacity() - reserved)
    }

    /// Pre-commit guard: false once the reserved count reached capacity.
    pub async fn has_stock(&self, item: &Item) -> Result<bool, InventoryError> {
        let reserved = self.get_reserved(item.item_id).await?;
        Ok(reserved < item.capacity())
    }

    pub async fn availability(&self, item: &Item) -> Result<ProductAvailability, InventoryError> {
        let current_quantity = self.available_quantity(item).await?;
        Ok(ProductAvailability {
            item: item.clone(),
            current_quantity,
        })
    }

    /// Atomically reserve one unit unless the item is sold out.
    pub async fn try_commit(&self, item: &Item) -> Result<CommitOutcome, InventoryError> {
        let key = Self::key(item.item_id);
        let capacity = item.capacity();

        for attempt in 0..MAX_COMMIT_ATTEMPTS {
            let current = self.store.get(&key).await?;
            let reserved = current.unwrap_or(0);
            if reserved >= capacity {
                return Ok(CommitOutcome::Exhausted);
            }

            if self
                .store
                .compare_and_set(&key, current, reserved + 1)
                .await?
            {
                let remaining = capacity - reserved - 1;
                debug!(item_id = item.item_id, reserved = reserved + 1, remaining, "stock committed");
                return Ok(CommitOutcome::Committed { remaining });
            }

            debug!(item_id = item.item_id, attempt, "stock commit raced, retrying");
        }

        Err(InventoryError::Contended { key })
    }

    /// Reset the reserved count of every item to 0.
    pub async fn reset<'a, I>(&self, items: I) -> Result<(), InventoryError>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let mut count = 0usize;
        for item in items {
            self.store.set(&Self::key(item.item_id), 0).await?;
            count += 1;
        }
        info!(items = count, "product stock reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockhub_counter_store::MemoryCounterStore;

    fn ledger() -> (StockLedger, MemoryCounterStore) {
        let store = MemoryCounterStore::new();
        (StockLedger::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn absent_item_has_nothing_reserved() {
        let (ledger, _) = ledger();
        assert_eq!(ledger.get_reserved(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reserve_writes_next_count() {
        let (ledger, store) = ledger();
        let item = Item::new(1, "Suitcase 250", 50.0, 4);

        let reserved = ledger.get_reserved(1).await.unwrap();
        ledger.reserve(1, reserved).await.unwrap();

        assert_eq!(store.get("item.1").await.unwrap(), Some(1));
        assert_eq!(ledger.available_quantity(&item).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn try_commit_stops_at_capacity() {
        let (ledger, _) = ledger();
        let item = Item::new(3, "Suitcase 650", 350.0, 2);

        assert_eq!(
            ledger.try_commit(&item).await.unwrap(),
            CommitOutcome::Committed { remaining: 1 }
        );
        let last = ledger.try_commit(&item).await.unwrap();
        assert!(last.exhausted_stock());
        assert_eq!(ledger.try_commit(&item).await.unwrap(), CommitOutcome::Exhausted);

        assert_eq!(ledger.get_reserved(3).await.unwrap(), 2);
        assert!(!ledger.has_stock(&item).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_commits_never_oversell() {
        let (ledger, _) = ledger();
        let item = Item::new(2, "Suitcase 450", 100.0, 10);

        let mut handles = Vec::new();
        for _ in 0..25 {
            let ledger = ledger.clone();
            let item = item.clone();
            handles.push(tokio::spawn(async move { ledger.try_commit(&item).await }));
        }

        let mut committed = 0;
        for handle in handles {
            if let Ok(CommitOutcome::Committed { .. }) = handle.await.unwrap() {
                committed += 1;
            }
        }

        assert_eq!(committed, 10);
        assert_eq!(ledger.get_reserved(2).await.unwrap(), 10);
        assert_eq!(ledger.available_quantity(&item).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reset_zeroes_every_item() {
        let (ledger, store) = ledger();
        store.set("item.1", 3).await.unwrap();
        let items = crate::default_products();

        ledger.reset(&items).await.unwrap();

        for item in &items {
            assert_eq!(ledger.get_reserved(item.item_id).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn unreachable_store_is_reported() {
        let (ledger, store) = ledger();
        store.set_reachable(false);
        assert!(matches!(
            ledger.get_reserved(1).await,
            Err(InventoryError::StoreUnavailable(_))
        ));
    }
}
