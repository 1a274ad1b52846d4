pub mod health;
pub mod render;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /render/start      submit a render job (GET or POST)
/// /render/status     poll job status
/// /render/result     poll for the finished chart
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/render", render::router())
}
