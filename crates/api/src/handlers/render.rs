//! Handlers for the `/render` resource.
//!
//! Submission is non-blocking: `start` creates a `pending` job and returns
//! immediately with poll URLs; the dispatcher picks the job up off the
//! request path. `status` and `result` are read-only lookups.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use plotforge_core::job::validate_cluster_count;
use plotforge_core::{Job, JobId, JobStatus};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Query parameters for `GET|POST /render/start`.
#[derive(Debug, Deserialize)]
pub struct StartParams {
    pub clusters: Option<u32>,
}

/// Query parameters for `GET /render/status` and `GET /render/result`.
///
/// The id is taken as a raw string: a value that does not parse as a job id
/// cannot match any known job and is reported as not-found, not as a
/// malformed request.
#[derive(Debug, Deserialize)]
pub struct JobIdParams {
    pub id: Option<String>,
}

/// Response for a successful submission: the job id plus poll handles.
#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub status_url: String,
    pub result_url: String,
}

/// Read-only view of a job's lifecycle state. Never carries the payload.
#[derive(Debug, Serialize)]
pub struct JobStatusView {
    pub job_id: JobId,
    pub status: JobStatus,
    pub clusters: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&Job> for JobStatusView {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            clusters: job.clusters,
            error: job.error.clone(),
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Extract the job id parameter and look the job up, or fail with
/// 400 (missing parameter) / 404 (unknown id).
fn find_job(state: &AppState, params: &JobIdParams) -> AppResult<Job> {
    let raw = params
        .id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Missing 'id' query parameter".into()))?;

    let not_found = || {
        AppError::Core(plotforge_core::CoreError::NotFound {
            entity: "Job",
            id: raw.to_string(),
        })
    };

    let id: JobId = raw.parse().map_err(|_| not_found())?;
    state.store.find(id).ok_or_else(not_found)
}

/// Map the configured fixture's extension to a response content type.
fn content_type_for_extension(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
        .as_str()
    {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

/// GET|POST /api/v1/render/start?clusters=<n>
///
/// Submit a new render job. Returns 202 with the job id and poll URLs.
/// The job starts in `pending` status and will be picked up by the
/// dispatcher; submission never waits for execution.
pub async fn start_render(
    State(state): State<AppState>,
    Query(params): Query<StartParams>,
) -> AppResult<impl IntoResponse> {
    let clusters = params.clusters.ok_or_else(|| {
        AppError::BadRequest("Provide 'clusters' as a query parameter. Example: ?clusters=5".into())
    })?;

    validate_cluster_count(clusters)?;

    let job = state.store.submit(clusters);

    tracing::info!(
        job_id = %job.id,
        clusters,
        "Render job submitted",
    );

    let response = StartResponse {
        job_id: job.id,
        status: job.status,
        status_url: format!("/api/v1/render/status?id={}", job.id),
        result_url: format!("/api/v1/render/result?id={}", job.id),
    };

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: response })))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/v1/render/status?id=<jobId>
///
/// Report the job's current lifecycle state. Returns 404 for unknown ids.
/// A `failed` job's error detail rides along in the view.
pub async fn get_status(
    State(state): State<AppState>,
    Query(params): Query<JobIdParams>,
) -> AppResult<impl IntoResponse> {
    let job = find_job(&state, &params)?;
    Ok(Json(DataResponse {
        data: JobStatusView::from(&job),
    }))
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// GET /api/v1/render/result?id=<jobId>
///
/// Retrieve the rendered chart. Returns 404 for unknown ids. While the job
/// is not `completed` the response is 202 with the status view -- that
/// includes `failed`, whose error detail is reported in the body rather
/// than as a retrieval error. Once `completed`, returns 200 with the chart
/// bytes; repeated calls return the same payload.
pub async fn get_result(
    State(state): State<AppState>,
    Query(params): Query<JobIdParams>,
) -> AppResult<Response> {
    let job = find_job(&state, &params)?;

    if job.status != JobStatus::Completed {
        let view = JobStatusView::from(&job);
        return Ok((StatusCode::ACCEPTED, Json(DataResponse { data: view })).into_response());
    }

    // Completed implies the payload is present; a bare record here means the
    // store invariant was broken.
    let bytes = job.result.ok_or_else(|| {
        AppError::InternalError(format!("Completed job {} has no stored result", job.id))
    })?;

    let content_type = content_type_for_extension(&state.config.chart_fixture_path);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, bytes.len().to_string())
        .header(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        )
        .body(Body::from(bytes))
        .unwrap())
}
