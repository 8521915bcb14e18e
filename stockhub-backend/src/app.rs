use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::handlers::{jobs, notifications, products, seats};
use crate::state::AppState;

/// Build the axum router with the provided shared application state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/available_seats", get(seats::available::available_seats))
        .route("/reserve_seat", get(seats::reserve::reserve_seat))
        .route("/process", get(seats::process::process))
        .route("/list_products", get(products::list::list_products))
        .route("/list_products/{itemId}", get(products::get::get_product))
        .route(
            "/reserve_product/{itemId}",
            get(products::reserve::reserve_product),
        )
        .route("/jobs", get(jobs::list::list_runs).delete(jobs::clear::clear_runs))
        .route("/jobs/{jobId}", get(jobs::get::get_run))
        .route(
            "/push_notifications",
            post(notifications::create::create_notifications),
        )
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .layer(Extension(state))
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Ready once the counter store answers.
async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match state.seats.available_seats().await {
        Ok(_) => (StatusCode::OK, "OK"),
        Err(error) => {
            tracing::warn!(%error, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "counter store unavailable")
        }
    }
}
