//! Job execution errors.

use stockhub_job_queue::JobQueueError;
use thiserror::Error;

/// Errors that may occur while sending a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Phone number {0} is blacklisted")]
    Blacklisted(String),
}

impl From<NotificationError> for JobQueueError {
    fn from(error: NotificationError) -> Self {
        JobQueueError::ExecutionFailed(error.to_string())
    }
}
