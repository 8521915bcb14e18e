//! Push notification jobs.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stockhub_job_queue::{EnqueueResult, JobContext, JobProcessor, JobQueueClient, JobQueueError};
use tracing::info;

use crate::error::NotificationError;
use crate::job_types;

/// Numbers that never receive notifications unless configured otherwise.
pub const DEFAULT_BLACKLISTED_NUMBERS: [&str; 2] = ["4153518780", "4153518781"];

/// Notifications sent at the same time.
pub const PUSH_NOTIFICATION_CONCURRENCY: usize = 2;

/// Payload for the push_notification_code job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushNotificationPayload {
    pub phone_number: String,
    pub message: String,
}

/// Processor for push_notification_code jobs.
///
/// Reports 0% on pickup, rejects blacklisted numbers, reports 50% and then
/// sends the message.
#[derive(Debug, Clone)]
pub struct PushNotificationProcessor {
    blacklist: HashSet<String>,
}

impl Default for PushNotificationProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl PushNotificationProcessor {
    pub fn new() -> Self {
        Self::with_blacklist(DEFAULT_BLACKLISTED_NUMBERS.iter().map(|n| n.to_string()))
    }

    pub fn with_blacklist(numbers: impl IntoIterator<Item = String>) -> Self {
        Self {
            blacklist: numbers.into_iter().collect(),
        }
    }

    fn ensure_allowed(&self, phone_number: &str) -> Result<(), NotificationError> {
        if self.blacklist.contains(phone_number) {
            return Err(NotificationError::Blacklisted(phone_number.to_owned()));
        }
        Ok(())
    }

    fn send_notification(&self, payload: &PushNotificationPayload) {
        info!(
            phone_number = %payload.phone_number,
            message = %payload.message,
            "sending notification"
        );
    }
}

#[async_trait]
impl JobProcessor for PushNotificationProcessor {
    fn job_type(&self) -> &str {
        job_types::PUSH_NOTIFICATION
    }

    async fn process(&self, ctx: JobContext, payload: Value) -> Result<(), JobQueueError> {
        let parsed: PushNotificationPayload = serde_json::from_value(payload)
            .map_err(|e| NotificationError::InvalidPayload(e.to_string()))?;

        ctx.progress(0).await;
        self.ensure_allowed(&parsed.phone_number)?;

        ctx.progress(50).await;
        self.send_notification(&parsed);
        Ok(())
    }
}

/// Enqueue one push notification job per element of `jobs`.
///
/// `jobs` must be a JSON array; otherwise nothing is enqueued and
/// [`JobQueueError::InvalidInput`] is returned.
pub async fn create_push_notifications_jobs(
    client: &JobQueueClient,
    jobs: Value,
) -> Result<Vec<EnqueueResult>, JobQueueError> {
    let results = client
        .enqueue_batch(job_types::PUSH_NOTIFICATION, jobs)
        .await?;
    for result in &results {
        info!(job_id = %result.job_id, "Notification job created");
    }
    Ok(results)
}
