//! Job entity and lifecycle status for the chart render engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Opaque job identifier, generated at submission.
pub type JobId = Uuid;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smallest accepted cluster count for a render request.
pub const MIN_CLUSTERS: u32 = 1;

/// Largest accepted cluster count for a render request.
pub const MAX_CLUSTERS: u32 = 64;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Render job execution status.
///
/// Transitions are forward-only: `Pending -> Running -> (Completed | Failed)`.
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether the status permits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Lowercase status label used in API responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A trackable unit of asynchronous render work.
///
/// Exactly one of `result` / `error` is present in a terminal state:
/// `result` iff `Completed`, `error` iff `Failed`. Both are `None` while
/// the job is `Pending` or `Running`. The store updates status and outcome
/// fields together so readers never see a half-written record.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    /// Cluster count supplied at submission. Immutable.
    pub clusters: u32,
    pub status: JobStatus,
    /// Rendered chart bytes, present only once `Completed`.
    pub result: Option<Vec<u8>>,
    /// Failure detail, present only once `Failed`.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new `Pending` job with a fresh id.
    pub fn new(clusters: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            clusters,
            status: JobStatus::Pending,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a requested cluster count.
///
/// Rules:
/// - Must be at least `MIN_CLUSTERS`.
/// - Must not exceed `MAX_CLUSTERS`.
pub fn validate_cluster_count(clusters: u32) -> Result<(), CoreError> {
    if clusters < MIN_CLUSTERS {
        return Err(CoreError::Validation(format!(
            "Cluster count must be at least {MIN_CLUSTERS}"
        )));
    }
    if clusters > MAX_CLUSTERS {
        return Err(CoreError::Validation(format!(
            "Cluster count must not exceed {MAX_CLUSTERS}"
        )));
    }
    Ok(())
}
