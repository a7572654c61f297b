pub mod auth;
pub mod health;
pub mod jobs;
pub mod modules;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login           login (public)
/// /auth/me              current principal info
///
/// /modules              accessible modules/scripts listing
/// /modules/execute      permission-checked job dispatch
///
/// /jobs                 caller's job history
/// /jobs/{job_id}        job status poll (reconciling)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/modules", modules::router())
        .nest("/jobs", jobs::router())
}
