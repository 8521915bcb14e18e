//! Persistence of job runs.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::JobQueueError;
use crate::types::JobRun;

/// Default number of job runs retained by [`MemoryJobStore`].
pub const DEFAULT_MAX_JOB_RUNS: usize = 1000;

/// Backing storage for job metadata.
///
/// `insert` is the enqueue write: an error there is reported to the caller of
/// [`JobQueueClient::enqueue`](crate::JobQueueClient::enqueue).
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, run: JobRun) -> Result<(), JobQueueError>;

    /// Overwrite a stored run. Updating an evicted run is not an error.
    async fn update(&self, run: &JobRun) -> Result<(), JobQueueError>;

    async fn get(&self, id: Uuid) -> Option<JobRun>;

    /// Runs ordered most recent first, optionally filtered by job type.
    async fn list(&self, job_type: Option<&str>, limit: usize, offset: usize) -> Vec<JobRun>;

    async fn count(&self, job_type: Option<&str>) -> usize;

    /// Remove finished runs. Queued and active runs stay visible.
    async fn clear(&self);
}

/// Internal storage optimized for both iteration and lookup by ID.
#[derive(Debug, Default)]
struct JobRunTable {
    /// Ordered list of job run IDs (oldest first).
    order: VecDeque<Uuid>,
    /// Map from ID to job run for O(1) lookup.
    runs: HashMap<Uuid, JobRun>,
}

impl JobRunTable {
    /// Insert a new job run, evicting the oldest finished runs beyond
    /// `max_runs`. Unfinished runs are never evicted.
    fn insert(&mut self, run: JobRun, max_runs: usize) {
        let id = run.id;
        self.runs.insert(id, run);
        self.order.push_back(id);

        while self.order.len() > max_runs {
            let runs = &self.runs;
            let Some(index) = self
                .order
                .iter()
                .position(|id| runs.get(id).map_or(true, |r| r.status.is_terminal()))
            else {
                break;
            };
            if let Some(old_id) = self.order.remove(index) {
                self.runs.remove(&old_id);
            }
        }
    }

    /// Drop every finished run.
    fn clear_finished(&mut self) {
        self.runs.retain(|_, run| !run.status.is_terminal());
        let runs = &self.runs;
        self.order.retain(|id| runs.contains_key(id));
    }

    /// Iterate over all runs in reverse order (most recent first).
    fn iter_recent(&self) -> impl Iterator<Item = &JobRun> {
        self.order.iter().rev().filter_map(|id| self.runs.get(id))
    }
}

/// Job store kept in process memory with a bounded retention window.
#[derive(Debug)]
pub struct MemoryJobStore {
    table: RwLock<JobRunTable>,
    max_runs: usize,
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_JOB_RUNS)
    }
}

impl MemoryJobStore {
    pub fn new(max_runs: usize) -> Self {
        Self {
            table: RwLock::new(JobRunTable::default()),
            max_runs: max_runs.max(1),
        }
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, run: JobRun) -> Result<(), JobQueueError> {
        let mut table = self.table.write().await;
        table.insert(run, self.max_runs);
        Ok(())
    }

    async fn update(&self, run: &JobRun) -> Result<(), JobQueueError> {
        let mut table = self.table.write().await;
        if let Some(existing) = table.runs.get_mut(&run.id) {
            *existing = run.clone();
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Option<JobRun> {
        let table = self.table.read().await;
        table.runs.get(&id).cloned()
    }

    async fn list(&self, job_type: Option<&str>, limit: usize, offset: usize) -> Vec<JobRun> {
        let table = self.table.read().await;
        let iter = table.iter_recent();

        match job_type {
            Some(name) => iter
                .filter(|r| r.job_type == name)
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
            None => iter.skip(offset).take(limit).cloned().collect(),
        }
    }

    async fn count(&self, job_type: Option<&str>) -> usize {
        let table = self.table.read().await;
        match job_type {
            Some(name) => table.runs.values().filter(|r| r.job_type == name).count(),
            None => table.runs.len(),
        }
    }

    async fn clear(&self) {
        let mut table = self.table.write().await;
        table.clear_finished();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn finished_run() -> JobRun {
        let mut run = JobRun::new("reserve_seat", json!(null));
        run.start();
        run.complete();
        run
    }

    #[tokio::test]
    async fn retention_evicts_oldest_finished_runs() {
        let store = MemoryJobStore::new(2);
        let first = finished_run();
        let first_id = first.id;
        store.insert(first).await.unwrap();
        store.insert(finished_run()).await.unwrap();
        store.insert(finished_run()).await.unwrap();

        assert_eq!(store.count(None).await, 2);
        assert!(store.get(first_id).await.is_none());
    }

    #[tokio::test]
    async fn retention_keeps_unfinished_runs() {
        let store = MemoryJobStore::new(2);
        let old_done = finished_run();
        let old_done_id = old_done.id;
        let queued = JobRun::new("reserve_seat", json!(null));
        let queued_id = queued.id;
        store.insert(queued).await.unwrap();
        store.insert(old_done).await.unwrap();
        store.insert(JobRun::new("reserve_seat", json!(null))).await.unwrap();

        // The finished run goes first even though the queued one is older.
        assert!(store.get(queued_id).await.is_some());
        assert!(store.get(old_done_id).await.is_none());

        for _ in 0..3 {
            store.insert(JobRun::new("reserve_seat", json!(null))).await.unwrap();
        }
        assert_eq!(store.count(None).await, 5);
    }

    #[tokio::test]
    async fn clear_removes_only_finished_runs() {
        let store = MemoryJobStore::default();
        let queued = JobRun::new("reserve_seat", json!(null));
        let queued_id = queued.id;
        let mut active = JobRun::new("reserve_seat", json!(null));
        active.start();
        let active_id = active.id;
        store.insert(queued).await.unwrap();
        store.insert(active).await.unwrap();
        store.insert(finished_run()).await.unwrap();

        store.clear().await;

        assert_eq!(store.count(None).await, 2);
        assert!(store.get(queued_id).await.is_some());
        assert!(store.get(active_id).await.is_some());
        let listed: Vec<Uuid> = store.list(None, 10, 0).await.iter().map(|r| r.id).collect();
        assert_eq!(listed, vec![active_id, queued_id]);
    }

    #[tokio::test]
    async fn list_filters_and_orders_most_recent_first() {
        let store = MemoryJobStore::default();
        let seat = JobRun::new("reserve_seat", json!(null));
        let product = JobRun::new("reserve_product", json!({ "itemId": 1 }));
        let product_id = product.id;
        store.insert(seat).await.unwrap();
        store.insert(product).await.unwrap();

        let all = store.list(None, 10, 0).await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, product_id);

        let seats = store.list(Some("reserve_seat"), 10, 0).await;
        assert_eq!(seats.len(), 1);
        assert_eq!(store.count(Some("reserve_product")).await, 1);
    }

    #[tokio::test]
    async fn update_overwrites_known_runs_only() {
        let store = MemoryJobStore::default();
        let mut run = JobRun::new("reserve_seat", json!(null));
        store.insert(run.clone()).await.unwrap();

        run.start();
        store.update(&run).await.unwrap();
        assert_eq!(store.get(run.id).await.unwrap().status, crate::JobStatus::Active);

        let stray = JobRun::new("reserve_seat", json!(null));
        store.update(&stray).await.unwrap();
        assert!(store.get(stray.id).await.is_none());

        run.complete();
        store.update(&run).await.unwrap();
        store.clear().await;
        assert_eq!(store.count(None).await, 0);
    }
}
