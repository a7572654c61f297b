//! Repository for the `modules` catalog table.

use sqlx::PgPool;

use crate::models::module::Module;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "name, display_name, description, created_at, updated_at";

/// Provides catalog operations for modules.
pub struct ModuleRepo;

impl ModuleRepo {
    /// Insert or refresh a module's display metadata.
    pub async fn upsert(
        pool: &PgPool,
        name: &str,
        display_name: &str,
        description: &str,
    ) -> Result<Module, sqlx::Error> {
        let query = format!(
            "INSERT INTO modules (name, display_name, description)
             VALUES ($1, $2, $3)
             ON CONFLICT (name) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                description = EXCLUDED.description,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(name)
            .bind(display_name)
            .bind(description)
            .fetch_one(pool)
            .await
    }

    /// List all modules ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Module>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM modules ORDER BY name ASC");
        sqlx::query_as::<_, Module>(&query).fetch_all(pool).await
    }
}
