use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use serde_json::{json, Value};

use crate::{error::ApiError, state::AppState};

/// POST /push_notifications
/// Body is an array of `{ phoneNumber, message }` objects, one job each.
pub async fn create_notifications(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let created = stockhub_jobs::create_push_notifications_jobs(&state.job_queue, body).await?;
    let ids: Vec<_> = created.iter().map(|result| result.job_id).collect();
    Ok(Json(json!({ "jobIds": ids })))
}
