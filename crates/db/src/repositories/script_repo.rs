//! Repository for the `scripts` catalog table.

use sqlx::PgPool;

use crate::models::script::Script;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, module_name, name, display_name, description, location, created_at, updated_at";

/// Result of a catalog upsert: the row plus whether it was newly created.
#[derive(Debug)]
pub struct UpsertedScript {
    pub script: Script,
    pub created: bool,
}

/// Provides catalog operations for scripts.
pub struct ScriptRepo;

impl ScriptRepo {
    /// Insert or refresh one script's metadata.
    ///
    /// Returns whether the row was newly created so the caller can apply
    /// the discovery grant policy to new scripts only.
    pub async fn upsert(
        pool: &PgPool,
        module_name: &str,
        name: &str,
        display_name: &str,
        description: &str,
        location: &str,
    ) -> Result<UpsertedScript, sqlx::Error> {
        if let Some(existing) = Self::find_by_module_and_name(pool, module_name, name).await? {
            let query = format!(
                "UPDATE scripts SET
                    display_name = $2,
                    description = $3,
                    location = $4,
                    updated_at = NOW()
                 WHERE id = $1
                 RETURNING {COLUMNS}"
            );
            let script = sqlx::query_as::<_, Script>(&query)
                .bind(existing.id)
                .bind(display_name)
                .bind(description)
                .bind(location)
                .fetch_one(pool)
                .await?;
            return Ok(UpsertedScript {
                script,
                created: false,
            });
        }

        let query = format!(
            "INSERT INTO scripts (module_name, name, display_name, description, location)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let script = sqlx::query_as::<_, Script>(&query)
            .bind(module_name)
            .bind(name)
            .bind(display_name)
            .bind(description)
            .bind(location)
            .fetch_one(pool)
            .await?;
        Ok(UpsertedScript {
            script,
            created: true,
        })
    }

    /// Find a script by its `(module, name)` identity.
    pub async fn find_by_module_and_name(
        pool: &PgPool,
        module_name: &str,
        name: &str,
    ) -> Result<Option<Script>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scripts WHERE module_name = $1 AND name = $2");
        sqlx::query_as::<_, Script>(&query)
            .bind(module_name)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List the full catalog, ordered by module then script name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Script>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scripts ORDER BY module_name ASC, name ASC");
        sqlx::query_as::<_, Script>(&query).fetch_all(pool).await
    }
}
