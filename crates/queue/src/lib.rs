//! Boundary to the external job-execution backend.
//!
//! The gateway never runs jobs itself; it submits them through the
//! [`JobQueue`] trait and polls their authoritative state back. Two
//! implementations exist: [`http::HttpJobQueue`] for a remote queue
//! service, and the in-process backend in `zeus-worker` for local/dev
//! deployments.

pub mod http;

use async_trait::async_trait;
use zeus_core::job::RemoteJobState;

/// Errors from the queue boundary.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The backend could not be reached, or the call timed out.
    ///
    /// A timed-out submission must surface as this variant -- it is never
    /// assumed to mean the job was accepted.
    #[error("queue unavailable: {0}")]
    Unavailable(String),

    /// The backend answered but the exchange was not usable
    /// (unexpected status code, undecodable body, unknown script).
    #[error("queue protocol error: {0}")]
    Protocol(String),
}

/// The external execution backend.
///
/// `submit` returns the backend-assigned job identifier; `status` returns
/// the authoritative state, or `None` when the backend has no trace of the
/// identifier.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Submit a job for asynchronous execution.
    async fn submit(
        &self,
        module_name: &str,
        script_name: Option<&str>,
        parameters: &serde_json::Value,
    ) -> Result<String, QueueError>;

    /// Query the authoritative state of a previously submitted job.
    async fn status(&self, external_id: &str) -> Result<Option<RemoteJobState>, QueueError>;
}
