//! Core types for the job queue system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Minimal representation of a job request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub job_type: String,
    pub payload: Value,
}

impl JobRequest {
    #[inline]
    pub fn new(job_type: impl Into<String>, payload: Value) -> Self {
        Self {
            job_type: job_type.into(),
            payload,
        }
    }
}

/// Result returned after a job has been enqueued.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnqueueResult {
    pub job_id: Uuid,
}

/// Status of a job run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Active,
    Completed,
    Failed,
}

impl JobStatus {
    /// Returns true if this status represents a terminal state.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Queued => "queued",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// A record of a job from enqueue to its terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRun {
    pub id: Uuid,
    pub job_type: String,
    pub status: JobStatus,
    pub progress: u8,
    pub enqueued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub payload: Value,
}

impl JobRun {
    /// Create a new queued job run.
    #[inline]
    pub fn new(job_type: impl Into<String>, payload: Value) -> Self {
        Self::with_id(Uuid::new_v4(), job_type, payload)
    }

    /// Create a new queued job run with a specific ID.
    #[inline]
    pub fn with_id(id: Uuid, job_type: impl Into<String>, payload: Value) -> Self {
        Self {
            id,
            job_type: job_type.into(),
            status: JobStatus::Queued,
            progress: 0,
            enqueued_at: Utc::now(),
            started_at: None,
            finished_at: None,
            error_message: None,
            payload,
        }
    }

    /// Mark the job as picked up by a processor.
    #[inline]
    pub fn start(&mut self) {
        self.status = JobStatus::Active;
        self.started_at = Some(Utc::now());
    }

    /// Record progress. Values above 100 are clamped and regressions are
    /// ignored; returns whether the value was accepted.
    pub fn set_progress(&mut self, percent: u8) -> bool {
        let percent = percent.min(100);
        if percent < self.progress {
            return false;
        }
        self.progress = percent;
        true
    }

    /// Mark the job as completed.
    #[inline]
    pub fn complete(&mut self) {
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.finished_at = Some(Utc::now());
    }

    /// Mark the job as failed with an error message.
    #[inline]
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.error_message = Some(message.into());
    }
}

/// Lifecycle notification published by the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum JobEvent {
    Progress {
        job_id: Uuid,
        job_type: String,
        percent: u8,
    },
    Completed {
        job_id: Uuid,
        job_type: String,
    },
    Failed {
        job_id: Uuid,
        job_type: String,
        error: String,
    },
}

impl JobEvent {
    pub fn job_id(&self) -> Uuid {
        match self {
            Self::Progress { job_id, .. }
            | Self::Completed { job_id, .. }
            | Self::Failed { job_id, .. } => *job_id,
        }
    }

    pub fn job_type(&self) -> &str {
        match self {
            Self::Progress { job_type, .. }
            | Self::Completed { job_type, .. }
            | Self::Failed { job_type, .. } => job_type,
        }
    }

    /// True for `Completed` and `Failed`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let mut run = JobRun::new("push_notification_code", json!({}));
        assert!(run.set_progress(50));
        assert!(!run.set_progress(10));
        assert_eq!(run.progress, 50);
        assert!(run.set_progress(250));
        assert_eq!(run.progress, 100);
    }

    #[test]
    fn lifecycle_transitions() {
        let mut run = JobRun::new("reserve_seat", json!(null));
        assert_eq!(run.status, JobStatus::Queued);
        assert!(run.started_at.is_none());

        run.start();
        assert_eq!(run.status, JobStatus::Active);
        assert!(!run.status.is_terminal());

        run.fail("Not enough seats available");
        assert_eq!(run.status, JobStatus::Failed);
        assert!(run.status.is_terminal());
        assert!(run.finished_at.is_some());
        assert_eq!(run.error_message.as_deref(), Some("Not enough seats available"));
    }

    #[test]
    fn event_serializes_with_tag() {
        let event = JobEvent::Failed {
            job_id: Uuid::nil(),
            job_type: "reserve_seat".into(),
            error: "boom".into(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "failed");
        assert_eq!(value["error"], "boom");
        assert!(event.is_terminal());
    }
}
