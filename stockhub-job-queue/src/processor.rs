//! Job processor trait and the context handed to processors.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::JobQueueError;
use crate::store::{JobStore, MemoryJobStore};
use crate::types::JobEvent;

/// Trait for implementing job processors.
///
/// Each job type has exactly one processor. The processor's return value is
/// the job's terminal outcome: `Ok(())` completes it, an error fails it.
#[async_trait]
pub trait JobProcessor: Send + Sync {
    /// Returns the job type this processor handles.
    fn job_type(&self) -> &str;

    /// Process one job.
    async fn process(&self, ctx: JobContext, payload: Value) -> Result<(), JobQueueError>;
}

/// Handle given to a processor for the job it is running.
///
/// Progress reported through the context is persisted on the job run and
/// published as a [`JobEvent::Progress`].
#[derive(Clone)]
pub struct JobContext {
    job_id: Uuid,
    job_type: String,
    progress: Arc<AtomicU8>,
    store: Arc<dyn JobStore>,
    events: broadcast::Sender<JobEvent>,
}

impl fmt::Debug for JobContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobContext")
            .field("job_id", &self.job_id)
            .field("job_type", &self.job_type)
            .field("progress", &self.progress.load(Ordering::SeqCst))
            .finish()
    }
}

impl JobContext {
    pub(crate) fn new(
        job_id: Uuid,
        job_type: impl Into<String>,
        store: Arc<dyn JobStore>,
        events: broadcast::Sender<JobEvent>,
    ) -> Self {
        Self {
            job_id,
            job_type: job_type.into(),
            progress: Arc::new(AtomicU8::new(0)),
            store,
            events,
        }
    }

    /// A context that is not attached to any queue, for driving a processor
    /// directly.
    pub fn detached(job_type: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self::new(
            Uuid::new_v4(),
            job_type,
            Arc::new(MemoryJobStore::default()),
            events,
        )
    }

    #[inline]
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    #[inline]
    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    /// Last accepted progress value.
    #[inline]
    pub fn current_progress(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    /// Report progress in percent. Values above 100 are clamped and values
    /// lower than the last report are ignored.
    pub async fn progress(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.progress.fetch_max(percent, Ordering::SeqCst);
        if percent < previous {
            debug!(job_id = %self.job_id, percent, previous, "ignoring progress regression");
            return;
        }

        if let Some(mut run) = self.store.get(self.job_id).await {
            run.set_progress(percent);
            if let Err(e) = self.store.update(&run).await {
                warn!(job_id = %self.job_id, error = %e, "failed to persist job progress");
            }
        }

        // No subscribers is fine.
        let _ = self.events.send(JobEvent::Progress {
            job_id: self.job_id,
            job_type: self.job_type.clone(),
            percent,
        });
    }
}

/// A no-op processor that immediately completes jobs.
#[derive(Debug, Default, Clone)]
pub struct NoOpProcessor {
    job_type: String,
}

impl NoOpProcessor {
    pub fn new(job_type: impl Into<String>) -> Self {
        Self {
            job_type: job_type.into(),
        }
    }
}

#[async_trait]
impl JobProcessor for NoOpProcessor {
    fn job_type(&self) -> &str {
        &self.job_type
    }

    async fn process(&self, _ctx: JobContext, _payload: Value) -> Result<(), JobQueueError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detached_context_tracks_progress() {
        let ctx = JobContext::detached("push_notification_code");
        ctx.progress(0).await;
        ctx.progress(50).await;
        ctx.progress(20).await;
        assert_eq!(ctx.current_progress(), 50);
        ctx.progress(120).await;
        assert_eq!(ctx.current_progress(), 100);
    }

    #[tokio::test]
    async fn noop_processor_completes() {
        let processor = NoOpProcessor::new("noop");
        assert_eq!(processor.job_type(), "noop");
        let ctx = JobContext::detached("noop");
        assert!(processor.process(ctx, Value::Null).await.is_ok());
    }
}
