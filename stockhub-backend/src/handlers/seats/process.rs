use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use serde_json::{json, Value};

use crate::{error::ApiError, state::AppState};

/// GET /process
/// Start consuming seat reservation jobs. Repeated calls are harmless.
pub async fn process(Extension(state): Extension<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    if state.seats.start_processing().await? {
        tracing::info!("seat reservation queue processing started");
    }
    Ok(Json(json!({ "status": "Queue processing" })))
}
