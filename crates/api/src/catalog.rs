//! Script catalog adapter: startup sync and permission-filtered listing.
//!
//! At boot the registry's metadata is mirrored into the `modules` and
//! `scripts` tables; discovery of a new script optionally grants it to all
//! existing principals (an explicit policy switch, not a side effect).
//! Listing filters the persisted catalog through the caller's permission
//! snapshot.

use serde::Serialize;
use sqlx::PgPool;
use zeus_core::catalog::{ModuleMetadata, ScriptMetadata};
use zeus_core::permissions::PermissionSet;
use zeus_db::models::script::Script;
use zeus_db::repositories::{ModuleRepo, PermissionRepo, ScriptRepo};

/// Summary of one catalog sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub modules: usize,
    pub scripts: usize,
    pub new_scripts: usize,
    pub grants: u64,
}

/// Mirror the registry catalog into the database.
///
/// Existing entries have their metadata refreshed; new scripts are
/// default-granted to every existing principal when `grant_on_discovery`
/// is on. Idempotent: a re-run with the same catalog grants nothing new.
pub async fn sync(
    pool: &PgPool,
    catalog: &[ModuleMetadata],
    grant_on_discovery: bool,
) -> Result<SyncReport, sqlx::Error> {
    let mut report = SyncReport::default();

    for module in catalog {
        ModuleRepo::upsert(pool, &module.name, &module.display_name, &module.description).await?;
        report.modules += 1;

        for script in &module.scripts {
            let upserted = ScriptRepo::upsert(
                pool,
                &script.module_name,
                &script.name,
                &script.display_name,
                &script.description,
                &script.location,
            )
            .await?;
            report.scripts += 1;

            if upserted.created {
                report.new_scripts += 1;
                if grant_on_discovery {
                    let granted =
                        PermissionRepo::grant_script_to_all_users(pool, upserted.script.id)
                            .await?;
                    report.grants += granted;
                    tracing::info!(
                        module = %script.module_name,
                        script = %script.name,
                        granted,
                        "New script cataloged and granted to all existing users",
                    );
                } else {
                    tracing::info!(
                        module = %script.module_name,
                        script = %script.name,
                        "New script cataloged (discovery grants disabled)",
                    );
                }
            }
        }
    }

    Ok(report)
}

/// Convert a persisted catalog row back into registry-shaped metadata.
pub fn script_metadata(script: &Script) -> ScriptMetadata {
    ScriptMetadata {
        module_name: script.module_name.clone(),
        name: script.name.clone(),
        display_name: script.display_name.clone(),
        description: script.description.clone(),
        location: script.location.clone(),
    }
}

/// One accessible script in a listing.
#[derive(Debug, Serialize)]
pub struct ScriptView {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

/// One accessible module in a listing.
#[derive(Debug, Serialize)]
pub struct ModuleView {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub scripts: Vec<ScriptView>,
}

/// List the modules and scripts the given snapshot can reach.
///
/// A module appears only when the module-level grant holds AND at least
/// one of its scripts is individually granted; each listed module contains
/// only the granted scripts. Ordering is deterministic: module name, then
/// script name (from the catalog queries).
pub async fn list_accessible(
    pool: &PgPool,
    permissions: &PermissionSet,
) -> Result<Vec<ModuleView>, sqlx::Error> {
    let modules = ModuleRepo::list(pool).await?;
    let scripts = ScriptRepo::list(pool).await?;

    let mut views = Vec::new();
    for module in modules {
        if !permissions.allows_module(&module.name) {
            continue;
        }

        let accessible: Vec<ScriptView> = scripts
            .iter()
            .filter(|s| s.module_name == module.name)
            .filter(|s| permissions.allows_script(&s.module_name, &s.name))
            .map(|s| ScriptView {
                name: s.name.clone(),
                display_name: s.display_name.clone(),
                description: s.description.clone(),
            })
            .collect();

        if accessible.is_empty() {
            continue;
        }

        views.push(ModuleView {
            name: module.name,
            display_name: module.display_name,
            description: module.description,
            scripts: accessible,
        });
    }

    Ok(views)
}
