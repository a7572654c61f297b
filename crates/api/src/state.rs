use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::dispatcher::JobDispatcher;
use crate::engine::reconciler::JobReconciler;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: zeus_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Permission-checked job submission service.
    pub dispatcher: Arc<JobDispatcher>,
    /// Queue-state reconciliation service.
    pub reconciler: Arc<JobReconciler>,
}
