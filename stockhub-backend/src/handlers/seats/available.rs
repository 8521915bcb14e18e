use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use serde_json::{json, Value};

use crate::{error::ApiError, state::AppState};

/// GET /available_seats
pub async fn available_seats(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let seats = state.seats.available_seats().await?;
    Ok(Json(json!({ "numberOfAvailableSeats": seats })))
}
