//! Handlers for the `/jobs` resource: status polling and history.

use axum::extract::{Path, Query, State};
use axum::Json;
use zeus_db::models::job::{Job, JobListQuery};
use zeus_db::repositories::JobRepo;

use crate::engine::reconciler::JobView;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/jobs/{job_id}
///
/// Poll one job by its backend identifier. Reconciles the backend's
/// authoritative state into the local record and returns the merged view.
/// Any authenticated principal may poll any job id.
pub async fn get_job(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobView>> {
    let view = state.reconciler.status(&job_id).await?;
    Ok(Json(view))
}

/// GET /api/v1/jobs
///
/// The caller's own job history, newest first. Supports `limit` and
/// `offset` query parameters.
pub async fn list_jobs(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> AppResult<Json<DataResponse<Vec<Job>>>> {
    let jobs = JobRepo::list_by_user(&state.pool, user.user_id, &params).await?;
    Ok(Json(DataResponse { data: jobs }))
}
