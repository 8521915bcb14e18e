//! Reservation job payloads.

use serde::Deserialize;
use serde_json::{json, Value};
use stockhub_inventory::ItemId;
use stockhub_job_queue::JobRequest;

use crate::error::ReservationError;

/// Job type constants for type-safe job references.
pub mod job_types {
    pub const RESERVE_SEAT: &str = "reserve_seat";
    pub const RESERVE_PRODUCT: &str = "reserve_product";
}

/// A reservation job, keyed by its job type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationJob {
    Seat,
    Product { item_id: ItemId },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProductPayload {
    item_id: ItemId,
}

impl ReservationJob {
    pub const fn job_type(self) -> &'static str {
        match self {
            Self::Seat => job_types::RESERVE_SEAT,
            Self::Product { .. } => job_types::RESERVE_PRODUCT,
        }
    }

    pub fn into_request(self) -> JobRequest {
        let payload = match self {
            Self::Seat => json!({}),
            Self::Product { item_id } => json!({ "itemId": item_id }),
        };
        JobRequest::new(self.job_type(), payload)
    }

    /// Decode a dequeued payload according to its job type.
    pub fn decode(job_type: &str, payload: Value) -> Result<Self, ReservationError> {
        match job_type {
            job_types::RESERVE_SEAT => match payload {
                Value::Null | Value::Object(_) => Ok(Self::Seat),
                other => Err(ReservationError::InvalidPayload(format!(
                    "expected an object, got {other}"
                ))),
            },
            job_types::RESERVE_PRODUCT => {
                // Derived struct deserializers also accept sequences.
                if !payload.is_object() {
                    return Err(ReservationError::InvalidPayload(format!(
                        "expected an object, got {payload}"
                    )));
                }
                let parsed: ProductPayload = serde_json::from_value(payload)
                    .map_err(|e| ReservationError::InvalidPayload(e.to_string()))?;
                Ok(Self::Product {
                    item_id: parsed.item_id,
                })
            }
            other => Err(ReservationError::InvalidPayload(format!(
                "unknown reservation job type: {other}"
            ))),
        }
    }
}
