//! Typed job queue used by StockHub.
//!
//! Jobs are persisted through a [`JobStore`] when enqueued and dispatched to
//! the [`JobProcessor`] registered for their type. Each job type has its own
//! FIFO lane and a concurrency limit; every job ends in exactly one terminal
//! state, published as a [`JobEvent`].
//!
//! # Architecture
//!
//! - [`JobQueueClient`] - The main interface for enqueuing and tracking jobs
//! - [`JobProcessor`] - Trait for implementing job handlers
//! - [`JobContext`] - Progress reporting handle passed to processors
//! - [`JobRun`] - A record of a job execution
//! - [`JobStore`] - Persistence of job runs ([`MemoryJobStore`] by default)
//!
//! # Example
//!
//! ```rust,no_run
//! use stockhub_job_queue::{async_trait, JobContext, JobProcessor, JobQueueClient, JobQueueError, JobRequest};
//! use serde_json::json;
//!
//! struct MyJobProcessor;
//!
//! #[async_trait]
//! impl JobProcessor for MyJobProcessor {
//!     fn job_type(&self) -> &str {
//!         "my.job"
//!     }
//!
//!     async fn process(&self, ctx: JobContext, payload: serde_json::Value) -> Result<(), JobQueueError> {
//!         ctx.progress(50).await;
//!         println!("Processing job with payload: {}", payload);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = JobQueueClient::new();
//!     client.register_processor(MyJobProcessor, 2).await.unwrap();
//!     client.start_processing("my.job").await.unwrap();
//!
//!     let request = JobRequest::new("my.job", json!({"key": "value"}));
//!     let result = client.enqueue(request).await.unwrap();
//!     println!("Enqueued job: {}", result.job_id);
//! }
//! ```

mod client;
mod error;
mod processor;
mod store;
mod types;

pub use client::{JobQueueClient, QueueOptions, DEFAULT_EVENT_CAPACITY};
pub use error::JobQueueError;
pub use processor::{JobContext, JobProcessor, NoOpProcessor};
pub use store::{JobStore, MemoryJobStore, DEFAULT_MAX_JOB_RUNS};
pub use types::{EnqueueResult, JobEvent, JobRequest, JobRun, JobStatus};

// Re-export async_trait for convenience when implementing JobProcessor
pub use async_trait::async_trait;
