//! Development seed data.
//!
//! Provisions the three demo principals with their module grants and a
//! full script grant set. Runs only when the `users` table is empty, so a
//! restarted deployment never re-seeds. Production principal management
//! happens on an external administrative path.

use sqlx::PgPool;
use zeus_db::models::user::CreateUser;
use zeus_db::repositories::{PermissionRepo, ScriptRepo, UserRepo};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};

/// Password shared by all demo principals.
const DEV_SEED_PASSWORD: &str = "secret";

/// Demo principals and their module grants.
const DEV_SEED_USERS: [(&str, &[&str]); 3] = [
    ("admin", &["module1", "module2", "module3"]),
    ("user1", &["module1", "module2"]),
    ("user2", &["module3"]),
];

/// Seed demo principals if the database has none.
///
/// Must run after catalog sync: module grants reference the `modules`
/// table and script grants reference the cataloged scripts.
pub async fn run(pool: &PgPool) -> AppResult<()> {
    if UserRepo::count(pool).await? > 0 {
        tracing::info!("Users already provisioned, skipping dev seed");
        return Ok(());
    }

    let password_hash = hash_password(DEV_SEED_PASSWORD)
        .map_err(|e| AppError::InternalError(format!("Seed password hashing failed: {e}")))?;

    let scripts = ScriptRepo::list(pool).await?;

    for (username, modules) in DEV_SEED_USERS {
        let user = UserRepo::create(
            pool,
            &CreateUser {
                username: username.to_string(),
                password_hash: password_hash.clone(),
            },
        )
        .await?;

        for module in modules {
            PermissionRepo::grant_module(pool, user.id, module).await?;
        }

        // Every seeded principal gets every cataloged script, matching the
        // discovery default-grant policy it would have received over time.
        for script in &scripts {
            PermissionRepo::grant_script(pool, user.id, script.id).await?;
        }

        tracing::info!(
            user_id = user.id,
            username,
            modules = ?modules,
            scripts = scripts.len(),
            "Seeded dev principal",
        );
    }

    Ok(())
}
