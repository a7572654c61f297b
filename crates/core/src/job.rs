//! Job lifecycle states and the reconciliation transform.
//!
//! The execution backend owns the authoritative state of a job; the gateway
//! keeps a persisted mirror. [`reconcile`] computes what (if anything) to
//! write to the mirror given both sides. It is a pure function so the
//! transition policy is testable without a queue or a database.

use serde::{Deserialize, Serialize};

/// Locally persisted job status.
///
/// `pending`, `success`, and `failed` are the states this gateway assigns;
/// anything else the backend reports (e.g. `running`, `retrying`) is
/// mirrored verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Success,
    Failed,
    Other(String),
}

impl JobStatus {
    /// Storage/wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
            JobStatus::Other(s) => s,
        }
    }

    /// Parse the storage representation. Unrecognized strings round-trip
    /// through `Other`.
    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => JobStatus::Pending,
            "success" => JobStatus::Success,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    /// Terminal states never move backward.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }
}

/// Authoritative state reported by the execution backend for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RemoteJobState {
    /// Queued, not yet picked up.
    Pending,
    /// Picked up by a worker.
    Running,
    /// Finished successfully with a result payload.
    Succeeded { result: serde_json::Value },
    /// Finished with an error.
    Failed { error: String },
    /// Any other backend-specific intermediate state.
    Other {
        #[serde(rename = "value")]
        state: String,
    },
}

/// A pending write to the local mirror, produced by [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub struct JobUpdate {
    pub status: JobStatus,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Decide what to persist given the mirror's current status and the
/// backend's authoritative state.
///
/// Policy:
/// - terminal backend states always win and are idempotent to re-apply;
/// - `pending` never mutates (the mirror starts pending by construction);
/// - intermediate states are mirrored verbatim, but never over a terminal
///   local status and never when the mirror already matches.
pub fn reconcile(local: &JobStatus, remote: &RemoteJobState) -> Option<JobUpdate> {
    match remote {
        RemoteJobState::Succeeded { result } => Some(JobUpdate {
            status: JobStatus::Success,
            result: Some(result.clone()),
            error: None,
        }),
        RemoteJobState::Failed { error } => Some(JobUpdate {
            status: JobStatus::Failed,
            result: None,
            error: Some(error.clone()),
        }),
        RemoteJobState::Pending => None,
        RemoteJobState::Running => mirror_intermediate(local, "running"),
        RemoteJobState::Other { state } => mirror_intermediate(local, state),
    }
}

fn mirror_intermediate(local: &JobStatus, state: &str) -> Option<JobUpdate> {
    if local.is_terminal() || local.as_str() == state {
        return None;
    }
    Some(JobUpdate {
        status: JobStatus::Other(state.to_string()),
        result: None,
        error: None,
    })
}
