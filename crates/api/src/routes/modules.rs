//! Route definitions for the `/modules` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::modules;
use crate::state::AppState;

/// Routes mounted at `/modules`.
///
/// ```text
/// GET  /         -> list_modules
/// POST /execute  -> execute
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(modules::list_modules))
        .route("/execute", post(modules::execute))
}
