use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::{json, Value};
use stockhub_reservations::ReservationStatus;

use crate::handlers::utils::parse_item_id_param;
use crate::{error::ApiError, state::AppState};

/// GET /reserve_product/{itemId}
pub async fn reserve_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let item_id = parse_item_id_param(&item_id)?;

    match state.products.request_reservation(item_id).await? {
        ReservationStatus::ProductNotFound => Err(ApiError::ProductNotFound),
        status => Ok(Json(json!({ "status": status, "itemId": item_id }))),
    }
}
