//! Concrete job implementations that are not part of the reservation flow.
//!
//! # Job Types
//!
//! - `push_notification_code` - Send a verification code to a phone number
//!
//! # Usage
//!
//! ```rust,no_run
//! use stockhub_job_queue::JobQueueClient;
//! use stockhub_jobs::register_all_processors;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = JobQueueClient::new();
//!     register_all_processors(&client, Vec::new()).await.unwrap();
//! }
//! ```

mod error;
mod notification;

pub use error::NotificationError;
pub use notification::{
    create_push_notifications_jobs, PushNotificationPayload, PushNotificationProcessor,
    DEFAULT_BLACKLISTED_NUMBERS, PUSH_NOTIFICATION_CONCURRENCY,
};

use stockhub_job_queue::{JobQueueClient, JobQueueError};

/// Register every processor of this crate and start consuming their jobs.
///
/// An empty `blacklist` falls back to [`DEFAULT_BLACKLISTED_NUMBERS`].
pub async fn register_all_processors(
    client: &JobQueueClient,
    blacklist: Vec<String>,
) -> Result<(), JobQueueError> {
    let processor = if blacklist.is_empty() {
        PushNotificationProcessor::new()
    } else {
        PushNotificationProcessor::with_blacklist(blacklist)
    };
    client
        .register_processor(processor, PUSH_NOTIFICATION_CONCURRENCY)
        .await?;
    client
        .start_processing(job_types::PUSH_NOTIFICATION)
        .await?;
    Ok(())
}

/// Job type constants for type-safe job references.
pub mod job_types {
    pub const PUSH_NOTIFICATION: &str = "push_notification_code";
}
