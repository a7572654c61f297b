//! Job record entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use zeus_core::job::JobStatus;
use zeus_core::types::{DbId, Timestamp};

/// A row from the `jobs` table: the local mirror of one externally
/// executing job, keyed by the backend's `external_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    #[serde(skip)]
    pub id: DbId,
    #[serde(rename = "job_id")]
    pub external_id: String,
    pub module_name: String,
    pub script_name: Option<String>,
    #[serde(skip)]
    pub submitted_by: DbId,
    pub status: String,
    pub parameters: serde_json::Value,
    pub result: Option<serde_json::Value>,
    #[serde(rename = "error")]
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    /// Typed view of the stored status string.
    pub fn job_status(&self) -> JobStatus {
        JobStatus::from_str(&self.status)
    }
}

/// DTO for recording a dispatched job.
///
/// Upserted on `external_id`: a colliding dispatch overwrites parameters
/// and resets the record to pending instead of erroring.
#[derive(Debug, Clone)]
pub struct RecordJob {
    pub external_id: String,
    pub module_name: String,
    pub script_name: Option<String>,
    pub submitted_by: DbId,
    pub parameters: serde_json::Value,
}

/// Query parameters for the job history listing.
#[derive(Debug, serde::Deserialize)]
pub struct JobListQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
