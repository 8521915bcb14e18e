//! Error types for the job queue system.

use thiserror::Error;
use uuid::Uuid;

/// Errors that may occur while interacting with the job queue.
#[derive(Debug, Error)]
pub enum JobQueueError {
    #[error("failed to enqueue job: {0}")]
    Enqueue(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("job not found: {0}")]
    NotFound(Uuid),

    #[error("no processor registered for job type {0}")]
    NoProcessor(String),

    #[error("job execution failed: {0}")]
    ExecutionFailed(String),

    #[error("job dispatch failed: {0}")]
    Dispatch(String),
}

impl JobQueueError {
    /// Message recorded on a failed job run.
    pub fn failure_message(&self) -> String {
        match self {
            Self::ExecutionFailed(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
