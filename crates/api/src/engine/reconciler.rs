//! Pull-based job state reconciliation.
//!
//! The mirror is only as fresh as the last poll; there is no push path.
//! Concurrent polls of the same job race harmlessly: every writer derives
//! its update from the same authoritative backend state via the pure
//! transition in `zeus_core::job`, so last-writer-wins is correct.

use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use zeus_core::error::CoreError;
use zeus_core::job::{reconcile, JobStatus, RemoteJobState};
use zeus_db::models::job::Job;
use zeus_db::repositories::JobRepo;
use zeus_queue::JobQueue;

use crate::error::{AppError, AppResult};

/// The merged view of one job returned to pollers.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub job_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobView {
    fn from_remote(job_id: &str, state: &RemoteJobState) -> Self {
        let (status, result, error) = match state {
            RemoteJobState::Pending => (JobStatus::Pending.as_str().to_string(), None, None),
            RemoteJobState::Running => ("running".to_string(), None, None),
            RemoteJobState::Succeeded { result } => (
                JobStatus::Success.as_str().to_string(),
                Some(result.clone()),
                None,
            ),
            RemoteJobState::Failed { error } => (
                JobStatus::Failed.as_str().to_string(),
                None,
                Some(error.clone()),
            ),
            RemoteJobState::Other { state } => (state.clone(), None, None),
        };
        Self {
            job_id: job_id.to_string(),
            status,
            result,
            error,
        }
    }

    fn from_record(job: &Job) -> Self {
        Self {
            job_id: job.external_id.clone(),
            status: job.status.clone(),
            result: job.result.clone(),
            error: job.error_message.clone(),
        }
    }
}

/// Queue-state reconciliation service.
pub struct JobReconciler {
    pool: PgPool,
    queue: Arc<dyn JobQueue>,
}

impl JobReconciler {
    pub fn new(pool: PgPool, queue: Arc<dyn JobQueue>) -> Self {
        Self { pool, queue }
    }

    /// Merge the backend's authoritative state into the mirror and return
    /// the freshest available view.
    ///
    /// A missing local record degrades to a queue-only view (the job was
    /// dispatched outside this gateway); a job the backend has forgotten
    /// degrades to the mirrored view. Only when neither side knows the
    /// identifier is the poll a 404.
    pub async fn status(&self, external_id: &str) -> AppResult<JobView> {
        let remote = self.queue.status(external_id).await?;

        // A read failure here must not mask a perfectly good queue answer.
        let local = match JobRepo::find_by_external_id(&self.pool, external_id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(job_id = %external_id, error = %e, "Job record lookup failed");
                None
            }
        };

        match (remote, local) {
            (Some(state), Some(job)) => {
                let view = self.apply(&job, &state).await;
                Ok(view)
            }
            (Some(state), None) => Ok(JobView::from_remote(external_id, &state)),
            (None, Some(job)) => Ok(JobView::from_record(&job)),
            (None, None) => Err(AppError::Core(CoreError::NotFound {
                entity: "Job",
                id: external_id.to_string(),
            })),
        }
    }

    /// Apply the transition (if any) to the mirror and build the view.
    ///
    /// Persistence failures are logged, not returned: the caller still
    /// gets the freshly computed view, and no write is retried within the
    /// poll.
    async fn apply(&self, job: &Job, state: &RemoteJobState) -> JobView {
        let local_status = job.job_status();

        match reconcile(&local_status, state) {
            Some(update) => {
                if let Err(e) = JobRepo::apply_update(
                    &self.pool,
                    &job.external_id,
                    &update.status,
                    update.result.as_ref(),
                    update.error.as_deref(),
                )
                .await
                {
                    tracing::error!(
                        job_id = %job.external_id,
                        error = %e,
                        "Failed to persist reconciled job state",
                    );
                }
                JobView {
                    job_id: job.external_id.clone(),
                    status: update.status.as_str().to_string(),
                    result: update.result,
                    error: update.error,
                }
            }
            // No transition: the terminal mirror wins over a stale
            // intermediate report; otherwise the remote view is current.
            None if local_status.is_terminal() => JobView::from_record(job),
            None => JobView::from_remote(&job.external_id, state),
        }
    }
}
