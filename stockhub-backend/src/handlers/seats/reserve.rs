use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /reserve_seat
/// Queue one seat reservation. Always answers 200 with a status string.
pub async fn reserve_seat(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let status = state.seats.request_reservation().await;
    Json(json!({ "status": status }))
}
