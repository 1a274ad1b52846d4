//! Route definitions for the `/render` resource.
//!
//! All endpoints are anonymous; the service has no auth surface.

use axum::routing::get;
use axum::Router;

use crate::handlers::render;
use crate::state::AppState;

/// Routes mounted at `/render`.
///
/// ```text
/// GET|POST  /start     -> start_render
/// GET       /status    -> get_status
/// GET       /result    -> get_result
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", get(render::start_render).post(render::start_render))
        .route("/status", get(render::get_status))
        .route("/result", get(render::get_result))
}
