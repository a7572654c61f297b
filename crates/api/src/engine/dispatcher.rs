//! Permission-checked job submission.
//!
//! Ordering invariant: the queue submission happens before the local
//! record write, so an existing record always corresponds to a job the
//! backend accepted. The inverse (accepted job, failed record write) is a
//! tolerated partial failure -- the backend remains the source of truth.

use std::sync::Arc;

use sqlx::PgPool;
use zeus_core::error::CoreError;
use zeus_core::job::JobStatus;
use zeus_core::permissions::script_scope;
use zeus_db::models::job::RecordJob;
use zeus_db::repositories::JobRepo;
use zeus_queue::JobQueue;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// A dispatch request after request-body validation.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub module_name: String,
    /// `None` selects the module's legacy entry point.
    pub script_name: Option<String>,
    pub parameters: serde_json::Value,
}

/// Outcome of a successful (or partially successful) dispatch.
#[derive(Debug)]
pub struct JobHandle {
    /// Backend-assigned job identifier.
    pub external_id: String,
    pub status: JobStatus,
    /// False when the job was accepted by the backend but the local
    /// record write failed; tracking for this job may be stale.
    pub tracked: bool,
}

/// Permission-checked job submission service.
pub struct JobDispatcher {
    pool: PgPool,
    queue: Arc<dyn JobQueue>,
}

impl JobDispatcher {
    pub fn new(pool: PgPool, queue: Arc<dyn JobQueue>) -> Self {
        Self { pool, queue }
    }

    /// Authorize, submit, and record one job.
    ///
    /// Script-scoped dispatch requires both the module grant and the
    /// script grant; module-level dispatch requires only the module grant.
    /// The denial names the first missing scope.
    pub async fn dispatch(&self, user: &AuthUser, request: DispatchRequest) -> AppResult<JobHandle> {
        if !user.permissions.allows_module(&request.module_name) {
            return Err(AppError::Core(CoreError::PermissionDenied {
                scope: request.module_name.clone(),
            }));
        }
        if let Some(script) = &request.script_name {
            if !user.permissions.allows_script(&request.module_name, script) {
                return Err(AppError::Core(CoreError::PermissionDenied {
                    scope: script_scope(&request.module_name, script),
                }));
            }
        }

        // Submission first. A failure here leaves no local trace: the
        // gateway never records a phantom job.
        let external_id = self
            .queue
            .submit(
                &request.module_name,
                request.script_name.as_deref(),
                &request.parameters,
            )
            .await?;

        let record = RecordJob {
            external_id: external_id.clone(),
            module_name: request.module_name.clone(),
            script_name: request.script_name.clone(),
            submitted_by: user.user_id,
            parameters: request.parameters.clone(),
        };

        // The upsert absorbs identifier collisions (retried submissions);
        // any other write failure is reported but does not undo the
        // submission that already happened.
        let tracked = match JobRepo::record_pending(&self.pool, &record).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    job_id = %external_id,
                    module = %request.module_name,
                    error = %e,
                    "Job accepted by queue but local record write failed",
                );
                false
            }
        };

        tracing::info!(
            job_id = %external_id,
            module = %request.module_name,
            script = request.script_name.as_deref().unwrap_or("<module>"),
            user_id = user.user_id,
            tracked,
            "Job dispatched",
        );

        Ok(JobHandle {
            external_id,
            status: JobStatus::Pending,
            tracked,
        })
    }
}
