//! The catalog product orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use stockhub_inventory::{
    Catalog, CommitOutcome, InventoryError, Item, ItemId, ProductAvailability, StockLedger,
};
use stockhub_job_queue::{JobContext, JobProcessor, JobQueueClient, JobQueueError};
use tracing::{info, warn};

use crate::error::ReservationError;
use crate::gate::ReservationGate;
use crate::job::{job_types, ReservationJob};
use crate::status::ReservationStatus;

type Gates = Arc<HashMap<ItemId, ReservationGate>>;

/// Accepts product reservation requests. Each catalog item has its own gate.
#[derive(Debug, Clone)]
pub struct ProductReservations {
    catalog: Arc<Catalog>,
    ledger: StockLedger,
    queue: JobQueueClient,
    gates: Gates,
}

impl ProductReservations {
    pub fn new(catalog: Catalog, ledger: StockLedger, queue: JobQueueClient) -> Self {
        let gates = catalog
            .items()
            .iter()
            .map(|item| (item.item_id, ReservationGate::new()))
            .collect();
        Self {
            catalog: Arc::new(catalog),
            ledger,
            queue,
            gates: Arc::new(gates),
        }
    }

    pub async fn install(&self, concurrency: usize) -> Result<(), JobQueueError> {
        let processor = ReserveProductProcessor {
            catalog: Arc::clone(&self.catalog),
            ledger: self.ledger.clone(),
            gates: Arc::clone(&self.gates),
        };
        self.queue.register_processor(processor, concurrency).await
    }

    pub async fn start_processing(&self) -> Result<bool, JobQueueError> {
        self.queue.start_processing(job_types::RESERVE_PRODUCT).await
    }

    /// Zero the reserved counter of every catalog item.
    pub async fn reset_stock(&self) -> Result<(), InventoryError> {
        self.ledger.reset(self.catalog.items()).await
    }

    pub fn list_products(&self) -> &[Item] {
        self.catalog.items()
    }

    /// Item details with the current quantity. Unknown ids fail before the
    /// store is consulted.
    pub async fn availability(&self, item_id: ItemId) -> Result<ProductAvailability, InventoryError> {
        let item = self.catalog.require(item_id)?;
        self.ledger.availability(item).await
    }

    pub fn gate(&self, item_id: ItemId) -> Option<&ReservationGate> {
        self.gates.get(&item_id)
    }

    /// Queue one unit of `item_id`.
    ///
    /// Unknown items, blocked items and items with no remaining quantity
    /// are rejected without creating a job. Store failures are returned as
    /// errors.
    pub async fn request_reservation(
        &self,
        item_id: ItemId,
    ) -> Result<ReservationStatus, ReservationError> {
        let Some(item) = self.catalog.get(item_id) else {
            return Ok(ReservationStatus::ProductNotFound);
        };

        if self.gate(item_id).is_some_and(|gate| !gate.is_open()) {
            return Ok(ReservationStatus::Blocked);
        }

        if !self.ledger.has_stock(item).await? {
            return Ok(ReservationStatus::NotEnoughStock);
        }

        let request = ReservationJob::Product { item_id }.into_request();
        match self.queue.enqueue(request).await {
            Ok(result) => {
                info!(job_id = %result.job_id, item_id, "product reservation job created");
                Ok(ReservationStatus::InProcess)
            }
            Err(e) => {
                warn!(error = %e, item_id, "failed to queue product reservation");
                Ok(ReservationStatus::Failed)
            }
        }
    }
}

/// Commits one unit of the requested item per job.
#[derive(Debug)]
pub struct ReserveProductProcessor {
    catalog: Arc<Catalog>,
    ledger: StockLedger,
    gates: Gates,
}

impl ReserveProductProcessor {
    fn block(&self, item_id: ItemId) {
        if let Some(gate) = self.gates.get(&item_id) {
            if gate.block() {
                info!(item_id, "item exhausted, reservations blocked");
            }
        }
    }
}

#[async_trait]
impl JobProcessor for ReserveProductProcessor {
    fn job_type(&self) -> &str {
        job_types::RESERVE_PRODUCT
    }

    async fn process(&self, ctx: JobContext, payload: Value) -> Result<(), JobQueueError> {
        let ReservationJob::Product { item_id } = ReservationJob::decode(ctx.job_type(), payload)?
        else {
            return Err(ReservationError::InvalidPayload("expected a product job".into()).into());
        };
        let item = self
            .catalog
            .require(item_id)
            .map_err(ReservationError::from)?;

        match self.ledger.try_commit(item).await.map_err(ReservationError::from)? {
            CommitOutcome::Exhausted => {
                self.block(item_id);
                Err(ReservationError::NoStock("stock").into())
            }
            outcome @ CommitOutcome::Committed { remaining } => {
                if outcome.exhausted_stock() {
                    self.block(item_id);
                }
                info!(job_id = %ctx.job_id(), item_id, remaining, "product reservation completed");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stockhub_counter_store::MemoryCounterStore;

    fn reservations(store: &MemoryCounterStore) -> ProductReservations {
        ProductReservations::new(
            Catalog::default(),
            StockLedger::new(Arc::new(store.clone())),
            JobQueueClient::new(),
        )
    }

    #[tokio::test]
    async fn unknown_item_never_touches_store() {
        let store = MemoryCounterStore::new();
        let reservations = reservations(&store);

        let status = reservations.request_reservation(99).await.unwrap();
        assert_eq!(status, ReservationStatus::ProductNotFound);
        assert!(matches!(
            reservations.availability(99).await,
            Err(InventoryError::ProductNotFound(99))
        ));
        assert_eq!(store.operation_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_reported() {
        let store = MemoryCounterStore::new();
        let reservations = reservations(&store);
        store.set_reachable(false);

        assert!(matches!(
            reservations.request_reservation(1).await,
            Err(ReservationError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn processor_fails_for_unknown_item() {
        let store = MemoryCounterStore::new();
        let reservations = reservations(&store);
        let processor = ReserveProductProcessor {
            catalog: Arc::clone(&reservations.catalog),
            ledger: reservations.ledger.clone(),
            gates: Arc::clone(&reservations.gates),
        };

        let ctx = JobContext::detached(job_types::RESERVE_PRODUCT);
        let err = processor
            .process(ctx, json!({ "itemId": 42 }))
            .await
            .unwrap_err();
        assert!(err.failure_message().contains("product not found"));
    }
}
