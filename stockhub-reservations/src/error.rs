//! Reservation errors.

use stockhub_inventory::InventoryError;
use stockhub_job_queue::JobQueueError;
use thiserror::Error;

/// Errors raised while processing a reservation.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// The resource was exhausted when the job ran.
    #[error("Not enough {0} available")]
    NoStock(&'static str),

    /// The counter store could not be reached or kept losing races.
    #[error("counter store unavailable: {0}")]
    StoreUnavailable(#[source] InventoryError),

    #[error(transparent)]
    Inventory(InventoryError),

    #[error("invalid reservation payload: {0}")]
    InvalidPayload(String),
}

impl From<InventoryError> for ReservationError {
    fn from(error: InventoryError) -> Self {
        match error {
            InventoryError::StoreUnavailable(_) | InventoryError::Contended { .. } => {
                Self::StoreUnavailable(error)
            }
            other => Self::Inventory(other),
        }
    }
}

impl From<ReservationError> for JobQueueError {
    fn from(error: ReservationError) -> Self {
        JobQueueError::ExecutionFailed(error.to_string())
    }
}
