//! The seat pool orchestrator.

use async_trait::async_trait;
use serde_json::Value;
use stockhub_inventory::{CommitOutcome, InventoryError, SeatLedger};
use stockhub_job_queue::{JobContext, JobProcessor, JobQueueClient, JobQueueError};
use tracing::{info, warn};

use crate::error::ReservationError;
use crate::gate::ReservationGate;
use crate::job::{job_types, ReservationJob};
use crate::status::ReservationStatus;

/// Accepts seat reservation requests and owns the seat gate.
#[derive(Debug, Clone)]
pub struct SeatReservations {
    ledger: SeatLedger,
    queue: JobQueueClient,
    gate: ReservationGate,
}

impl SeatReservations {
    pub fn new(ledger: SeatLedger, queue: JobQueueClient) -> Self {
        Self {
            ledger,
            queue,
            gate: ReservationGate::new(),
        }
    }

    /// Register the seat processor. Jobs are only consumed after
    /// [`SeatReservations::start_processing`].
    pub async fn install(&self, concurrency: usize) -> Result<(), JobQueueError> {
        let processor = ReserveSeatProcessor {
            ledger: self.ledger.clone(),
            gate: self.gate.clone(),
        };
        self.queue.register_processor(processor, concurrency).await
    }

    /// Start consuming seat jobs. Returns `false` if already started.
    pub async fn start_processing(&self) -> Result<bool, JobQueueError> {
        self.queue.start_processing(job_types::RESERVE_SEAT).await
    }

    pub async fn initialize(&self, seats: i64) -> Result<(), InventoryError> {
        self.ledger.initialize(seats).await
    }

    pub async fn available_seats(&self) -> Result<i64, InventoryError> {
        self.ledger.current_available_seats().await
    }

    pub fn gate(&self) -> &ReservationGate {
        &self.gate
    }

    /// Queue one seat reservation unless the pool is already blocked.
    pub async fn request_reservation(&self) -> ReservationStatus {
        if !self.gate.is_open() {
            return ReservationStatus::Blocked;
        }

        match self.queue.enqueue(ReservationJob::Seat.into_request()).await {
            Ok(result) => {
                info!(job_id = %result.job_id, "seat reservation job created");
                ReservationStatus::InProcess
            }
            Err(e) => {
                warn!(error = %e, "failed to queue seat reservation");
                ReservationStatus::Failed
            }
        }
    }
}

/// Commits one seat per job and closes the gate once the pool is empty.
#[derive(Debug)]
pub struct ReserveSeatProcessor {
    ledger: SeatLedger,
    gate: ReservationGate,
}

#[async_trait]
impl JobProcessor for ReserveSeatProcessor {
    fn job_type(&self) -> &str {
        job_types::RESERVE_SEAT
    }

    async fn process(&self, ctx: JobContext, payload: Value) -> Result<(), JobQueueError> {
        ReservationJob::decode(ctx.job_type(), payload)?;

        match self.ledger.try_take_seat().await.map_err(ReservationError::from)? {
            CommitOutcome::Exhausted => {
                if self.gate.block() {
                    info!("seat pool exhausted, reservations blocked");
                }
                Err(ReservationError::NoStock("seats").into())
            }
            outcome @ CommitOutcome::Committed { remaining } => {
                if outcome.exhausted_stock() && self.gate.block() {
                    info!("last seat reserved, reservations blocked");
                }
                info!(job_id = %ctx.job_id(), remaining, "seat reservation completed");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stockhub_counter_store::MemoryCounterStore;

    fn processor(store: &MemoryCounterStore) -> (ReserveSeatProcessor, ReservationGate) {
        let gate = ReservationGate::new();
        let processor = ReserveSeatProcessor {
            ledger: SeatLedger::new(Arc::new(store.clone())),
            gate: gate.clone(),
        };
        (processor, gate)
    }

    #[tokio::test]
    async fn last_seat_closes_gate() {
        let store = MemoryCounterStore::new();
        let (processor, gate) = processor(&store);
        processor.ledger.initialize(1).await.unwrap();

        let ctx = JobContext::detached(job_types::RESERVE_SEAT);
        processor.process(ctx, serde_json::json!({})).await.unwrap();

        assert!(!gate.is_open());
        assert_eq!(processor.ledger.current_available_seats().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_pool_fails_with_no_stock() {
        let store = MemoryCounterStore::new();
        let (processor, gate) = processor(&store);

        let ctx = JobContext::detached(job_types::RESERVE_SEAT);
        let err = processor
            .process(ctx, serde_json::json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.failure_message(), "Not enough seats available");
        assert!(!gate.is_open());
    }

    #[tokio::test]
    async fn unreachable_store_leaves_gate_open() {
        let store = MemoryCounterStore::new();
        let (processor, gate) = processor(&store);
        processor.ledger.initialize(5).await.unwrap();
        store.set_reachable(false);

        let ctx = JobContext::detached(job_types::RESERVE_SEAT);
        assert!(processor.process(ctx, serde_json::json!({})).await.is_err());
        assert!(gate.is_open());
    }
}
