//! In-memory job registry shared by the HTTP handlers and the dispatcher.
//!
//! The store is the single source of truth for job state. Submission is the
//! only path that creates records, the executor is the only path that moves
//! them forward, and retrieval is strictly read-only. All mutations happen
//! under one write lock so a reader always sees status and outcome fields
//! from the same update.
//!
//! Jobs live for the process lifetime; there is no expiry. Restart loses
//! state, which is acceptable for this service -- durability would mean
//! swapping this crate's backing store, not changing its API.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use chrono::Utc;
use plotforge_core::{CoreError, Job, JobId, JobStatus};

/// Per-status job counts, for logs and queue introspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobCounts {
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Default)]
struct StoreInner {
    jobs: HashMap<JobId, Job>,
    /// FIFO dispatch order for pending jobs.
    queue: VecDeque<JobId>,
}

/// Thread-safe registry of render jobs.
#[derive(Default)]
pub struct JobStore {
    inner: RwLock<StoreInner>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new `Pending` job and enqueue it for dispatch.
    ///
    /// The job is visible to [`find`](Self::find) immediately, before any
    /// executor has picked it up.
    pub fn submit(&self, clusters: u32) -> Job {
        let job = Job::new(clusters);
        let mut inner = self.inner.write().expect("job store lock poisoned");
        inner.queue.push_back(job.id);
        inner.jobs.insert(job.id, job.clone());
        job
    }

    /// Claim the oldest job that is still `Pending`, transitioning it to
    /// `Running` in the same critical section.
    ///
    /// A job that has already left `Pending` is skipped and never claimed
    /// again, so execution happens at most once per job.
    pub fn claim_next(&self) -> Option<Job> {
        let mut inner = self.inner.write().expect("job store lock poisoned");
        while let Some(id) = inner.queue.pop_front() {
            if let Some(job) = inner.jobs.get_mut(&id) {
                if job.status == JobStatus::Pending {
                    job.status = JobStatus::Running;
                    job.started_at = Some(Utc::now());
                    return Some(job.clone());
                }
            }
        }
        None
    }

    /// Record a successful render: stores the chart bytes, stamps
    /// `completed_at`, and moves the job to `Completed`.
    ///
    /// Rejected with `Conflict` if the job is already terminal.
    pub fn complete(&self, id: JobId, result: Vec<u8>) -> Result<(), CoreError> {
        self.finish(id, |job| {
            job.status = JobStatus::Completed;
            job.result = Some(result);
        })
    }

    /// Record a failed render with a descriptive error message.
    ///
    /// Rejected with `Conflict` if the job is already terminal.
    pub fn fail(&self, id: JobId, message: impl Into<String>) -> Result<(), CoreError> {
        let message = message.into();
        self.finish(id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(message);
        })
    }

    /// Read-only snapshot of a job, outcome bytes included.
    pub fn find(&self, id: JobId) -> Option<Job> {
        let inner = self.inner.read().expect("job store lock poisoned");
        inner.jobs.get(&id).cloned()
    }

    /// Current number of jobs in each status.
    pub fn counts(&self) -> JobCounts {
        let inner = self.inner.read().expect("job store lock poisoned");
        let mut counts = JobCounts::default();
        for job in inner.jobs.values() {
            match job.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::Running => counts.running += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Apply a terminal transition under the write lock.
    fn finish(&self, id: JobId, apply: impl FnOnce(&mut Job)) -> Result<(), CoreError> {
        let mut inner = self.inner.write().expect("job store lock poisoned");
        let job = inner.jobs.get_mut(&id).ok_or_else(|| CoreError::NotFound {
            entity: "Job",
            id: id.to_string(),
        })?;

        if job.status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Job {id} is already {} and cannot change state",
                job.status
            )));
        }

        apply(job);
        job.completed_at = Some(Utc::now());
        Ok(())
    }
}
