#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use stockhub_backend::build_router;
use stockhub_backend::state::{AppState, BootstrapOptions};
use stockhub_counter_store::MemoryCounterStore;
use stockhub_inventory::Catalog;
use stockhub_job_queue::JobQueueClient;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub store: MemoryCounterStore,
}

pub async fn spawn_app(options: BootstrapOptions) -> TestApp {
    spawn_app_with_catalog(options, Catalog::default()).await
}

pub async fn spawn_app_with_catalog(options: BootstrapOptions, catalog: Catalog) -> TestApp {
    let store = MemoryCounterStore::new();
    let state = AppState::new(Arc::new(store.clone()), catalog, JobQueueClient::new());
    state.bootstrap(&options).await.expect("bootstrap");
    let state = Arc::new(state);
    TestApp {
        router: build_router(Arc::clone(&state)),
        state,
        store,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    /// Poll until `count` runs of `job_type` reached a terminal state.
    pub async fn wait_for_terminal(&self, job_type: &str, count: usize) {
        let queue = &self.state.job_queue;
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let runs = queue.list_runs(Some(job_type), usize::MAX, 0).await;
                if runs.iter().filter(|r| r.status.is_terminal()).count() >= count {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("jobs did not finish in time");
    }
}
