//! Handlers for the `/modules` resource: catalog listing and dispatch.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, ModuleView};
use crate::engine::dispatcher::DispatchRequest;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /modules/execute`.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub module_name: String,
    /// Omitted for legacy module-level dispatch.
    pub script_name: Option<String>,
    /// Opaque payload forwarded to the script.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Response body for `POST /modules/execute`.
#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub job_id: String,
    pub status: String,
    pub message: &'static str,
}

/// Response body for `GET /modules`.
#[derive(Debug, Serialize)]
pub struct ModuleListResponse {
    pub modules: Vec<ModuleView>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/modules
///
/// List the modules and scripts the caller's permission snapshot can
/// reach. Modules with no accessible script are omitted entirely.
pub async fn list_modules(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ModuleListResponse>> {
    let modules = catalog::list_accessible(&state.pool, &user.permissions).await?;
    Ok(Json(ModuleListResponse { modules }))
}

/// POST /api/v1/modules/execute
///
/// Dispatch a job. Returns 201 with the backend-assigned job id; the job
/// itself runs asynchronously and is polled via `GET /jobs/{job_id}`.
pub async fn execute(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ExecuteRequest>,
) -> AppResult<impl IntoResponse> {
    if input.module_name.is_empty() {
        return Err(AppError::BadRequest("module_name must not be empty".into()));
    }
    if let Some(script) = &input.script_name {
        if script.is_empty() {
            return Err(AppError::BadRequest(
                "script_name must not be empty when present".into(),
            ));
        }
    }

    let parameters = if input.parameters.is_null() {
        serde_json::json!({})
    } else {
        input.parameters
    };

    let handle = state
        .dispatcher
        .dispatch(
            &user,
            DispatchRequest {
                module_name: input.module_name,
                script_name: input.script_name,
                parameters,
            },
        )
        .await?;

    let message = if handle.tracked {
        "Task submitted successfully"
    } else {
        // Documented partial failure: the job runs, tracking may be stale.
        "Task submitted; tracking record could not be persisted"
    };

    Ok((
        StatusCode::CREATED,
        Json(ExecuteResponse {
            job_id: handle.external_id,
            status: handle.status.as_str().to_string(),
            message,
        }),
    ))
}
