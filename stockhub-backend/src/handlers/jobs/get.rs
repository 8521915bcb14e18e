use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use crate::handlers::utils::job_run_to_payload;
use crate::{error::ApiError, state::AppState};

/// GET /jobs/{jobId}
pub async fn get_run(
    Extension(state): Extension<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let job_id = Uuid::parse_str(&job_id)
        .map_err(|_| ApiError::bad_request("jobId must be a UUID"))?;
    let run = state.job_queue.get_run(job_id).await?;
    Ok(Json(job_run_to_payload(&run)))
}
