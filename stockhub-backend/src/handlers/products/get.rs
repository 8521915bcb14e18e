use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use stockhub_inventory::ProductAvailability;

use crate::handlers::utils::parse_item_id_param;
use crate::{error::ApiError, state::AppState};

/// GET /list_products/{itemId}
/// Item details with `currentQuantity`.
pub async fn get_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Json<ProductAvailability>, ApiError> {
    let item_id = parse_item_id_param(&item_id)?;
    let availability = state.products.availability(item_id).await?;
    Ok(Json(availability))
}
