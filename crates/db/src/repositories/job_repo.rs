//! Repository for the `jobs` table.
//!
//! The mirror is keyed by the backend's `external_id`; every write is
//! scoped to one key, so concurrent polls of the same job contend only on
//! that row and last-writer-wins is safe (all writers derive their update
//! from the same authoritative backend state).

use sqlx::PgPool;
use zeus_core::job::JobStatus;
use zeus_core::types::DbId;

use crate::models::job::{Job, JobListQuery, RecordJob};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, external_id, module_name, script_name, submitted_by, status, \
                       parameters, result, error_message, created_at, updated_at";

/// Maximum page size for the history listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for the history listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides operations for job records.
pub struct JobRepo;

impl JobRepo {
    /// Record a dispatched job as pending.
    ///
    /// Idempotent under `external_id` collision: a retried dispatch
    /// overwrites parameters, reclaims ownership, and resets the record to
    /// pending with result/error cleared.
    pub async fn record_pending(pool: &PgPool, input: &RecordJob) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (external_id, module_name, script_name, submitted_by, status, parameters)
             VALUES ($1, $2, $3, $4, 'pending', $5)
             ON CONFLICT (external_id) DO UPDATE SET
                module_name = EXCLUDED.module_name,
                script_name = EXCLUDED.script_name,
                submitted_by = EXCLUDED.submitted_by,
                status = 'pending',
                parameters = EXCLUDED.parameters,
                result = NULL,
                error_message = NULL,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(&input.external_id)
            .bind(&input.module_name)
            .bind(&input.script_name)
            .bind(input.submitted_by)
            .bind(&input.parameters)
            .fetch_one(pool)
            .await
    }

    /// Find a job record by the backend's identifier.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE external_id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a reconciliation outcome to the mirror.
    ///
    /// Atomic single-row update by key. Idempotent: re-applying the same
    /// terminal state writes the same values. Returns `false` if no record
    /// exists for the identifier.
    pub async fn apply_update(
        pool: &PgPool,
        external_id: &str,
        status: &JobStatus,
        result: Option<&serde_json::Value>,
        error_message: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE jobs SET
                status = $2,
                result = $3,
                error_message = $4,
                updated_at = NOW()
             WHERE external_id = $1",
        )
        .bind(external_id)
        .bind(status.as_str())
        .bind(result)
        .bind(error_message)
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() > 0)
    }

    /// List a user's job records, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        params: &JobListQuery,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM jobs
             WHERE submitted_by = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
