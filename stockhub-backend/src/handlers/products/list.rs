use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use stockhub_inventory::Item;

use crate::state::AppState;

/// GET /list_products
pub async fn list_products(Extension(state): Extension<Arc<AppState>>) -> Json<Vec<Item>> {
    Json(state.products.list_products().to_vec())
}
