//! Job queue client implementation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, Mutex, Semaphore};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::JobQueueError;
use crate::processor::{JobContext, JobProcessor};
use crate::store::{JobStore, MemoryJobStore, DEFAULT_MAX_JOB_RUNS};
use crate::types::{EnqueueResult, JobEvent, JobRequest, JobRun};

/// Default capacity of the lifecycle event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Tuning knobs for a [`JobQueueClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueOptions {
    /// Events buffered per subscriber before slow subscribers start lagging.
    pub event_capacity: usize,
    /// Job runs retained by the in-memory job store.
    pub max_job_runs: usize,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
            max_job_runs: DEFAULT_MAX_JOB_RUNS,
        }
    }
}

struct Registration {
    processor: Arc<dyn JobProcessor>,
    concurrency: usize,
}

/// Per job type FIFO of queued runs.
///
/// The lane owns a copy of each run so a job still executes when its record
/// is gone from the store. The receiver is handed to the dispatch loop when
/// processing starts.
struct Lane {
    sender: mpsc::UnboundedSender<JobRun>,
    receiver: Option<mpsc::UnboundedReceiver<JobRun>>,
    registration: Option<Registration>,
}

impl Lane {
    fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Some(receiver),
            registration: None,
        }
    }

    #[inline]
    fn is_processing(&self) -> bool {
        self.receiver.is_none()
    }
}

/// Interface for enqueuing jobs, running them and tracking their lifecycle.
#[derive(Clone)]
pub struct JobQueueClient {
    store: Arc<dyn JobStore>,
    lanes: Arc<Mutex<HashMap<String, Lane>>>,
    events: broadcast::Sender<JobEvent>,
}

impl fmt::Debug for JobQueueClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQueueClient")
            .field("store", &"<dyn JobStore>")
            .field("lanes", &"<Mutex<HashMap<String, Lane>>>")
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}

impl Default for JobQueueClient {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueueClient {
    pub fn new() -> Self {
        Self::with_options(QueueOptions::default())
    }

    pub fn with_options(options: QueueOptions) -> Self {
        Self::with_store(
            Arc::new(MemoryJobStore::new(options.max_job_runs)),
            options.event_capacity,
        )
    }

    /// Build a client persisting job runs through `store`.
    pub fn with_store(store: Arc<dyn JobStore>, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            store,
            lanes: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    /// Subscribe to lifecycle events of every job.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// Bind a processor to its job type.
    ///
    /// At most `concurrency` jobs of that type are active at the same time.
    /// Registration must happen before [`JobQueueClient::start_processing`].
    pub async fn register_processor<P: JobProcessor + 'static>(
        &self,
        processor: P,
        concurrency: usize,
    ) -> Result<(), JobQueueError> {
        if concurrency == 0 {
            return Err(JobQueueError::InvalidInput(
                "concurrency must be at least 1".into(),
            ));
        }

        let job_type = processor.job_type().to_owned();
        let mut lanes = self.lanes.lock().await;
        let lane = lanes.entry(job_type.clone()).or_insert_with(Lane::new);
        if lane.is_processing() {
            return Err(JobQueueError::InvalidInput(format!(
                "job type {job_type} is already being processed"
            )));
        }

        lane.registration = Some(Registration {
            processor: Arc::new(processor),
            concurrency,
        });
        info!(job_type = %job_type, concurrency, "job processor registered");
        Ok(())
    }

    /// Start consuming queued jobs of `job_type`.
    ///
    /// Idempotent: returns `false` when the consumer was already running.
    pub async fn start_processing(&self, job_type: &str) -> Result<bool, JobQueueError> {
        let mut lanes = self.lanes.lock().await;
        let lane = lanes
            .get_mut(job_type)
            .ok_or_else(|| JobQueueError::NoProcessor(job_type.to_owned()))?;

        let (processor, concurrency) = match &lane.registration {
            Some(registration) => (Arc::clone(&registration.processor), registration.concurrency),
            None => return Err(JobQueueError::NoProcessor(job_type.to_owned())),
        };

        let Some(receiver) = lane.receiver.take() else {
            debug!(job_type = %job_type, "job processing already started");
            return Ok(false);
        };

        tokio::spawn(
            self.clone()
                .dispatch(job_type.to_owned(), receiver, processor, concurrency),
        );
        info!(job_type = %job_type, concurrency, "job processing started");
        Ok(true)
    }

    /// Enqueue a job for asynchronous processing.
    ///
    /// The job is persisted in the `queued` state before this returns; a
    /// store rejection is returned to the caller.
    pub async fn enqueue(&self, request: JobRequest) -> Result<EnqueueResult, JobQueueError> {
        let JobRequest { job_type, payload } = request;
        let run = JobRun::new(&job_type, payload);
        let job_id = run.id;

        self.store.insert(run.clone()).await?;

        let mut lanes = self.lanes.lock().await;
        let lane = lanes.entry(job_type.clone()).or_insert_with(Lane::new);
        lane.sender
            .send(run)
            .map_err(|_| JobQueueError::Enqueue(format!("dispatch lane for {job_type} is closed")))?;

        debug!(job_id = %job_id, job_type = %job_type, "job enqueued");
        Ok(EnqueueResult { job_id })
    }

    /// Enqueue one job per element of `jobs`, which must be a JSON array.
    ///
    /// Nothing is enqueued when `jobs` is not an array.
    pub async fn enqueue_batch(
        &self,
        job_type: &str,
        jobs: Value,
    ) -> Result<Vec<EnqueueResult>, JobQueueError> {
        let Value::Array(payloads) = jobs else {
            return Err(JobQueueError::InvalidInput("Jobs is not an array".into()));
        };

        let mut results = Vec::with_capacity(payloads.len());
        for payload in payloads {
            results.push(self.enqueue(JobRequest::new(job_type, payload)).await?);
        }
        Ok(results)
    }

    async fn dispatch(
        self,
        job_type: String,
        mut receiver: mpsc::UnboundedReceiver<JobRun>,
        processor: Arc<dyn JobProcessor>,
        concurrency: usize,
    ) {
        let permits = Arc::new(Semaphore::new(concurrency));

        while let Some(run) = receiver.recv().await {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };

            let queue = self.clone();
            let processor = Arc::clone(&processor);
            tokio::spawn(async move {
                queue.run_job(run, processor).await;
                drop(permit);
            });
        }

        debug!(job_type = %job_type, "dispatch loop stopped");
    }

    /// Run a single job to its terminal state and publish exactly one
    /// terminal event for it.
    async fn run_job(&self, queued: JobRun, processor: Arc<dyn JobProcessor>) {
        let job_id = queued.id;
        let mut run = match self.store.get(job_id).await {
            Some(stored) => stored,
            None => {
                debug!(job_id = %job_id, "queued job no longer in store, running from lane copy");
                queued
            }
        };

        run.start();
        if let Err(e) = self.store.update(&run).await {
            warn!(job_id = %job_id, error = %e, "failed to persist job start");
        }

        let ctx = JobContext::new(
            job_id,
            &run.job_type,
            Arc::clone(&self.store),
            self.events.clone(),
        );
        let payload = run.payload.clone();
        let outcome = tokio::spawn(async move { processor.process(ctx, payload).await }).await;

        let result = match outcome {
            Ok(result) => result,
            Err(join_error) => Err(JobQueueError::Dispatch(format!(
                "processor aborted: {join_error}"
            ))),
        };

        // Pick up progress written while the job was active.
        if let Some(latest) = self.store.get(job_id).await {
            run = latest;
        }

        let event = match result {
            Ok(()) => {
                run.complete();
                info!(job_id = %job_id, job_type = %run.job_type, "job completed");
                JobEvent::Completed {
                    job_id,
                    job_type: run.job_type.clone(),
                }
            }
            Err(e) => {
                let error = e.failure_message();
                run.fail(error.clone());
                warn!(job_id = %job_id, job_type = %run.job_type, %error, "job failed");
                JobEvent::Failed {
                    job_id,
                    job_type: run.job_type.clone(),
                    error,
                }
            }
        };

        if let Err(e) = self.store.update(&run).await {
            warn!(job_id = %job_id, error = %e, "failed to persist job outcome");
        }
        let _ = self.events.send(event);
    }

    /// List job runs, most recent first, optionally filtered by job type.
    pub async fn list_runs(
        &self,
        job_type: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Vec<JobRun> {
        self.store.list(job_type, limit, offset).await
    }

    /// Get total count of job runs, optionally filtered by job type.
    pub async fn count_runs(&self, job_type: Option<&str>) -> usize {
        self.store.count(job_type).await
    }

    /// Clear finished job runs. Queued and active runs are kept.
    pub async fn clear_runs(&self) {
        self.store.clear().await;
    }

    /// Get a specific job run by ID.
    pub async fn get_run(&self, id: Uuid) -> Result<JobRun, JobQueueError> {
        self.store.get(id).await.ok_or(JobQueueError::NotFound(id))
    }
}
