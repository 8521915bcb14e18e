mod common;

use axum::http::StatusCode;
use serde_json::json;
use stockhub_backend::state::BootstrapOptions;

use common::spawn_app;

fn seats(initial: i64) -> BootstrapOptions {
    BootstrapOptions {
        initial_seats: initial,
        ..BootstrapOptions::default()
    }
}

#[tokio::test]
async fn available_seats_starts_at_initial_count() {
    let app = spawn_app(BootstrapOptions::default()).await;
    let (status, body) = app.get("/available_seats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "numberOfAvailableSeats": 50 }));
}

#[tokio::test]
async fn reservations_wait_for_process() {
    let app = spawn_app(seats(3)).await;

    for _ in 0..2 {
        let (status, body) = app.get("/reserve_seat").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "Reservation in process" }));
    }
    // Nothing is consumed before /process.
    let (_, body) = app.get("/available_seats").await;
    assert_eq!(body["numberOfAvailableSeats"], 3);

    let (status, body) = app.get("/process").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "Queue processing" }));
    app.wait_for_terminal("reserve_seat", 2).await;

    let (_, body) = app.get("/available_seats").await;
    assert_eq!(body["numberOfAvailableSeats"], 1);

    // Calling /process again does not start a second consumer.
    let (status, _) = app.get("/process").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn last_seat_blocks_further_reservations() {
    let app = spawn_app(seats(1)).await;
    app.get("/process").await;

    let (_, body) = app.get("/reserve_seat").await;
    assert_eq!(body["status"], "Reservation in process");
    app.wait_for_terminal("reserve_seat", 1).await;

    let (_, body) = app.get("/reserve_seat").await;
    assert_eq!(body, json!({ "status": "Reservations are blocked" }));

    let (_, body) = app.get("/available_seats").await;
    assert_eq!(body["numberOfAvailableSeats"], 0);
    assert_eq!(app.state.job_queue.count_runs(Some("reserve_seat")).await, 1);
}

#[tokio::test]
async fn overbooked_job_fails_with_no_stock() {
    let app = spawn_app(seats(2)).await;
    for _ in 0..3 {
        app.get("/reserve_seat").await;
    }
    app.get("/process").await;
    app.wait_for_terminal("reserve_seat", 3).await;

    let (status, body) = app.get("/jobs?jobType=reserve_seat").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    let failed: Vec<_> = items.iter().filter(|r| r["status"] == "failed").collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["errorMessage"], "Not enough seats available");
    assert_eq!(body["pagination"]["total"], 3);
}

#[tokio::test]
async fn store_outage_is_internal_error() {
    let app = spawn_app(BootstrapOptions::default()).await;
    app.store.set_reachable(false);

    let (status, body) = app.get("/available_seats").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "status": "Internal Server Error" }));

    let (status, _) = app.get("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, _) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
}
