use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use stockhub_inventory::InventoryError;
use stockhub_job_queue::JobQueueError;
use stockhub_reservations::ReservationError;
use thiserror::Error;

/// Top-level API error shared by all route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid product ID")]
    InvalidProductId,
    #[error("Product not found")]
    ProductNotFound,
    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),
    #[error("reservation error: {0}")]
    Reservation(#[from] ReservationError),
    #[error("job queue error: {0}")]
    JobQueue(#[from] JobQueueError),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, payload) = match &self {
            ApiError::InvalidProductId => (
                StatusCode::BAD_REQUEST,
                json!({ "status": "Invalid product ID" }),
            ),
            ApiError::ProductNotFound
            | ApiError::Inventory(InventoryError::ProductNotFound(_))
            | ApiError::Inventory(InventoryError::UnknownProductId(_))
            | ApiError::Reservation(ReservationError::Inventory(InventoryError::ProductNotFound(_))) => {
                (StatusCode::NOT_FOUND, json!({ "status": "Product not found" }))
            }
            ApiError::Inventory(InventoryError::InvalidInput(_)) => (
                StatusCode::BAD_REQUEST,
                json!({ "status": "Invalid product ID" }),
            ),
            ApiError::Inventory(_) | ApiError::Reservation(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "status": "Internal Server Error" }),
                )
            }
            ApiError::JobQueue(JobQueueError::InvalidInput(_)) | ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            ApiError::JobQueue(JobQueueError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }
            ApiError::JobQueue(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": self.to_string() }),
            ),
        };

        (status, Json(payload)).into_response()
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

/// Failures while preparing the application state.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to seed inventory: {0}")]
    Inventory(#[from] InventoryError),
    #[error("failed to register job processors: {0}")]
    JobQueue(#[from] JobQueueError),
}
