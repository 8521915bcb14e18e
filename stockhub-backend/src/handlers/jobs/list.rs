use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::Json;
use serde_json::{json, Value};

use crate::handlers::utils::{job_run_to_payload, parse_positive_usize};
use crate::{error::ApiError, state::AppState};

/// GET /jobs
/// List job runs, most recent first, with optional `jobType` filter and
/// pagination.
pub async fn list_runs(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let page = parse_positive_usize(params.get("page"), 1, "page")?;
    let per_page = parse_positive_usize(params.get("perPage"), 20, "perPage")?;
    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or_else(|| ApiError::bad_request("page is out of range"))?;
    let job_type_filter = params.get("jobType").map(|s| s.as_str());

    let total = state.job_queue.count_runs(job_type_filter).await;
    let runs = state
        .job_queue
        .list_runs(job_type_filter, per_page, offset)
        .await;

    let items: Vec<Value> = runs.iter().map(job_run_to_payload).collect();

    Ok(Json(json!({
        "items": items,
        "pagination": {
            "page": page,
            "perPage": per_page,
            "total": total,
        }
    })))
}
