//! Single seat pool ledger.

use std::fmt;
use std::sync::Arc;

use stockhub_counter_store::CounterStore;
use tracing::{debug, info};

use crate::error::InventoryError;
use crate::{CommitOutcome, MAX_COMMIT_ATTEMPTS};

/// Store key holding the number of remaining seats.
pub const SEATS_KEY: &str = "available_seats";

/// Tracks the number of seats still available.
///
/// Unlike [`StockLedger`](crate::StockLedger) the stored value is the
/// *remaining* count and goes down as seats are taken.
#[derive(Clone)]
pub struct SeatLedger {
    store: Arc<dyn CounterStore>,
}

impl fmt::Debug for SeatLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeatLedger")
            .field("store", &"<dyn CounterStore>")
            .finish()
    }
}

impl SeatLedger {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Seats still available. An absent key counts as 0.
    pub async fn current_available_seats(&self) -> Result<i64, InventoryError> {
        Ok(self.store.get(SEATS_KEY).await?.unwrap_or(0))
    }

    /// Set the number of remaining seats to `number`.
    pub async fn reserve_seat(&self, number: i64) -> Result<(), InventoryError> {
        self.store.set(SEATS_KEY, number).await?;
        Ok(())
    }

    /// Initialise the pool at service start.
    pub async fn initialize(&self, seats: i64) -> Result<(), InventoryError> {
        self.reserve_seat(seats).await?;
        info!(seats, "seat pool initialized");
        Ok(())
    }

    /// Atomically take one seat unless none are left.
    pub async fn try_take_seat(&self) -> Result<CommitOutcome, InventoryError> {
        for attempt in 0..MAX_COMMIT_ATTEMPTS {
            let current = self.store.get(SEATS_KEY).await?;
            let available = current.unwrap_or(0);
            if available <= 0 {
                return Ok(CommitOutcome::Exhausted);
            }

            if self
                .store
                .compare_and_set(SEATS_KEY, current, available - 1)
                .await?
            {
                debug!(remaining = available - 1, "seat taken");
                return Ok(CommitOutcome::Committed {
                    remaining: available - 1,
                });
            }

            debug!(attempt, "seat commit raced, retrying");
        }

        Err(InventoryError::Contended {
            key: SEATS_KEY.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockhub_counter_store::MemoryCounterStore;

    fn ledger() -> SeatLedger {
        SeatLedger::new(Arc::new(MemoryCounterStore::new()))
    }

    #[tokio::test]
    async fn absent_pool_has_no_seats() {
        assert_eq!(ledger().current_available_seats().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reserve_seat_sets_remaining_count() {
        let ledger = ledger();
        ledger.initialize(50).await.unwrap();
        let available = ledger.current_available_seats().await.unwrap();
        ledger.reserve_seat(available - 1).await.unwrap();
        assert_eq!(ledger.current_available_seats().await.unwrap(), 49);
    }

    #[tokio::test]
    async fn take_seat_counts_down_to_zero() {
        let ledger = ledger();
        ledger.initialize(2).await.unwrap();

        assert_eq!(
            ledger.try_take_seat().await.unwrap(),
            CommitOutcome::Committed { remaining: 1 }
        );
        assert!(ledger.try_take_seat().await.unwrap().exhausted_stock());
        assert_eq!(ledger.try_take_seat().await.unwrap(), CommitOutcome::Exhausted);
        assert_eq!(ledger.current_available_seats().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_takes_never_go_negative() {
        let ledger = ledger();
        ledger.initialize(5).await.unwrap();

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.try_take_seat().await })
            })
            .collect();

        let mut taken = 0;
        for handle in handles {
            if let Ok(CommitOutcome::Committed { .. }) = handle.await.unwrap() {
                taken += 1;
            }
        }

        assert_eq!(taken, 5);
        assert_eq!(ledger.current_available_seats().await.unwrap(), 0);
    }
}
