use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use plotforge_api::config::ServerConfig;
use plotforge_api::routes;
use plotforge_api::state::AppState;
use plotforge_core::{Job, JobId};
use plotforge_engine::{ChartRenderer, JobDispatcher};
use plotforge_store::JobStore;

/// Bytes written to the chart fixture used by the test renderer.
pub const FIXTURE_BYTES: &[u8] = b"\xFF\xD8\xFFtest-chart-bytes";

/// A fully wired application under test: router, store, and a running
/// dispatcher with millisecond-scale delays.
///
/// The dispatcher is stopped when the harness is dropped. The temp
/// directory holding the fixture lives as long as the harness.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<JobStore>,
    cancel: CancellationToken,
    _fixture_dir: tempfile::TempDir,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Build a test `ServerConfig` with safe defaults and fast timings.
pub fn test_config(fixture_path: std::path::PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        render_delay_ms: 20,
        chart_fixture_path: fixture_path,
        dispatch_interval_ms: 5,
    }
}

/// Spawn the full application with the fixture present on disk.
pub fn spawn_test_app() -> TestApp {
    spawn(true)
}

/// Spawn the full application with a fixture path that does not exist,
/// so every render job fails.
pub fn spawn_test_app_without_fixture() -> TestApp {
    spawn(false)
}

fn spawn(write_fixture: bool) -> TestApp {
    let fixture_dir = tempfile::tempdir().expect("create temp dir");
    let fixture_path = fixture_dir.path().join("chart.jpeg");
    if write_fixture {
        std::fs::write(&fixture_path, FIXTURE_BYTES).expect("write fixture");
    }

    let config = test_config(fixture_path);
    let store = Arc::new(JobStore::new());

    let renderer = Arc::new(ChartRenderer::new(
        config.chart_fixture_path.clone(),
        config.render_delay(),
    ));
    let cancel = CancellationToken::new();
    let dispatcher = JobDispatcher::new(Arc::clone(&store), renderer)
        .with_poll_interval(config.dispatch_interval());
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        dispatcher.run(cancel_clone).await;
    });

    let state = AppState {
        store: Arc::clone(&store),
        config: Arc::new(config),
    };

    TestApp {
        app: build_test_app(state),
        store,
        cancel,
        _fixture_dir: fixture_dir,
    }
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Issue a GET request against the app and return the raw response.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into raw bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Collect and parse a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll the store until the given job reaches a terminal state.
pub async fn wait_for_terminal(store: &JobStore, id: JobId) -> Job {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(job) = store.find(id) {
                if job.status.is_terminal() {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("job did not reach a terminal state in time")
}
