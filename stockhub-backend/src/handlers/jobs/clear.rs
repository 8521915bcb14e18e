use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// DELETE /jobs
/// Clear finished job runs. Queued and active runs are kept and still run.
pub async fn clear_runs(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    state.job_queue.clear_runs().await;
    Json(json!({ "cleared": true }))
}
