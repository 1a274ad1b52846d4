//! Background job dispatcher.
//!
//! Polls the store every `poll_interval` and spawns a render task for each
//! claimed job. Claiming transitions the job to `Running` inside the store's
//! write lock, so a job is executed at most once even with multiple
//! dispatchers running. Spawned tasks are independent; jobs render
//! concurrently with no ordering between them.

use std::sync::Arc;
use std::time::Duration;

use plotforge_core::Job;
use plotforge_store::JobStore;
use tokio_util::sync::CancellationToken;

use crate::renderer::ChartRenderer;

/// Default polling interval for the dispatcher loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Background job dispatcher.
///
/// A single long-lived Tokio task that moves pending jobs into execution.
pub struct JobDispatcher {
    store: Arc<JobStore>,
    renderer: Arc<ChartRenderer>,
    poll_interval: Duration,
}

impl JobDispatcher {
    /// Create a new dispatcher with the default poll interval.
    pub fn new(store: Arc<JobStore>, renderer: Arc<ChartRenderer>) -> Self {
        Self {
            store,
            renderer,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the poll interval (used by config and tests).
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the dispatcher loop until the cancellation token is triggered.
    ///
    /// In-flight render tasks are not aborted on shutdown; they run to
    /// completion and write their outcome into the store.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Job dispatcher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job dispatcher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.dispatch_pending();
                }
            }
        }
    }

    /// One dispatch cycle: claim every pending job and spawn its render task.
    fn dispatch_pending(&self) {
        while let Some(job) = self.store.claim_next() {
            tracing::info!(
                job_id = %job.id,
                clusters = job.clusters,
                "Job claimed for execution",
            );

            let store = Arc::clone(&self.store);
            let renderer = Arc::clone(&self.renderer);
            tokio::spawn(async move {
                execute(store, renderer, job).await;
            });
        }
    }
}

/// Run one job to its terminal state.
///
/// Render errors are captured into the job record and never propagated;
/// the polling side observes them as a `Failed` status.
async fn execute(store: Arc<JobStore>, renderer: Arc<ChartRenderer>, job: Job) {
    match renderer.render(job.clusters).await {
        Ok(bytes) => {
            if let Err(e) = store.complete(job.id, bytes) {
                tracing::error!(job_id = %job.id, error = %e, "Failed to record job result");
            } else {
                tracing::info!(job_id = %job.id, "Job completed");
            }
        }
        Err(render_err) => {
            tracing::error!(job_id = %job.id, error = %render_err, "Job failed");
            if let Err(e) = store.fail(job.id, render_err.to_string()) {
                tracing::error!(job_id = %job.id, error = %e, "Failed to record job failure");
            }
        }
    }
}
