//! Repository for the `module_permissions` and `script_permissions` grant
//! tables.
//!
//! Reads produce the per-principal snapshot the claims issuer embeds in
//! tokens; writes belong to the seed and catalog-sync paths.

use sqlx::PgPool;
use zeus_core::permissions::PermissionSet;
use zeus_core::types::DbId;

/// Provides grant lookups and grant writes for both permission layers.
pub struct PermissionRepo;

impl PermissionRepo {
    /// Module names granted to a user, ordered for determinism.
    pub async fn modules_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT module_name FROM module_permissions
             WHERE user_id = $1
             ORDER BY module_name ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// `(module, script)` pairs granted to a user, ordered for determinism.
    pub async fn scripts_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<(String, String)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT s.module_name, s.name
             FROM script_permissions sp
             JOIN scripts s ON s.id = sp.script_id
             WHERE sp.user_id = $1
             ORDER BY s.module_name ASC, s.name ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Load a user's full permission snapshot (both layers).
    pub async fn snapshot_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<PermissionSet, sqlx::Error> {
        let modules = Self::modules_for_user(pool, user_id).await?;
        let scripts = Self::scripts_for_user(pool, user_id).await?;
        Ok(PermissionSet::new(modules, scripts))
    }

    /// Grant a module to a user. Idempotent.
    pub async fn grant_module(
        pool: &PgPool,
        user_id: DbId,
        module_name: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO module_permissions (user_id, module_name)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(module_name)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Grant a script to a user. Idempotent.
    pub async fn grant_script(
        pool: &PgPool,
        user_id: DbId,
        script_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO script_permissions (user_id, script_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(script_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Grant a script to every existing user. Idempotent.
    ///
    /// Implements the catalog default-grant-on-discovery policy; callers
    /// decide whether the policy is on.
    pub async fn grant_script_to_all_users(
        pool: &PgPool,
        script_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO script_permissions (user_id, script_id)
             SELECT id, $1 FROM users
             ON CONFLICT DO NOTHING",
        )
        .bind(script_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
