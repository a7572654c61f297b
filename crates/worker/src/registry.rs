//! Static script registry.
//!
//! Maps `(module, script)` to a handler function resolved at startup, so a
//! cataloged script without an implementation is a boot-time configuration
//! error rather than a runtime dispatch failure. The registry is also the
//! source of the catalog metadata the gateway mirrors into the database.

use std::collections::BTreeMap;

use zeus_core::catalog::{ModuleMetadata, ScriptMetadata};
use zeus_core::permissions::script_scope;

/// A script implementation: opaque parameters in, structured result out.
///
/// Handlers run on a blocking thread and may sleep; an `Err` becomes the
/// job's failure message.
pub type ScriptHandler = fn(&serde_json::Value) -> Result<serde_json::Value, String>;

/// Registry validation failure: cataloged scripts with no handler.
#[derive(Debug, thiserror::Error)]
#[error("no handler registered for cataloged script(s): {}", missing.join(", "))]
pub struct MissingHandlers {
    /// Dotted scopes of the unresolvable scripts.
    pub missing: Vec<String>,
}

struct ModuleEntry {
    display_name: String,
    description: String,
    /// Entry point for legacy module-level dispatch (no script name).
    module_handler: Option<ScriptHandler>,
    scripts: BTreeMap<String, ScriptEntry>,
}

struct ScriptEntry {
    display_name: String,
    description: String,
    handler: ScriptHandler,
}

/// The `(module, script)` -> handler mapping plus catalog metadata.
///
/// Backed by ordered maps so [`catalog`](Self::catalog) output is
/// deterministic.
#[derive(Default)]
pub struct ScriptRegistry {
    modules: BTreeMap<String, ModuleEntry>,
}

impl ScriptRegistry {
    /// Empty registry; compose with the `register_*` methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or refresh) a module's display metadata.
    pub fn register_module(&mut self, name: &str, display_name: &str, description: &str) {
        self.modules
            .entry(name.to_string())
            .and_modify(|m| {
                m.display_name = display_name.to_string();
                m.description = description.to_string();
            })
            .or_insert_with(|| ModuleEntry {
                display_name: display_name.to_string(),
                description: description.to_string(),
                module_handler: None,
                scripts: BTreeMap::new(),
            });
    }

    /// Set the entry point used when a job names only the module.
    ///
    /// # Panics
    ///
    /// Panics if the module is unknown, like
    /// [`register_script`](Self::register_script).
    pub fn set_module_handler(&mut self, module: &str, handler: ScriptHandler) {
        let entry = self
            .modules
            .get_mut(module)
            .unwrap_or_else(|| panic!("module '{module}' must be registered before its handler"));
        entry.module_handler = Some(handler);
    }

    /// Register a script under a previously registered module.
    ///
    /// # Panics
    ///
    /// Panics if the module is unknown -- registration happens once at
    /// startup from static definitions, so this is a programming error.
    pub fn register_script(
        &mut self,
        module: &str,
        name: &str,
        display_name: &str,
        description: &str,
        handler: ScriptHandler,
    ) {
        let entry = self
            .modules
            .get_mut(module)
            .unwrap_or_else(|| panic!("module '{module}' must be registered before its scripts"));
        entry.scripts.insert(
            name.to_string(),
            ScriptEntry {
                display_name: display_name.to_string(),
                description: description.to_string(),
                handler,
            },
        );
    }

    /// Look up the handler for a script. `None` means not registered.
    pub fn handler(&self, module: &str, script: &str) -> Option<ScriptHandler> {
        self.modules
            .get(module)
            .and_then(|m| m.scripts.get(script))
            .map(|s| s.handler)
    }

    /// Look up the legacy module-level entry point.
    pub fn module_handler(&self, module: &str) -> Option<ScriptHandler> {
        self.modules.get(module).and_then(|m| m.module_handler)
    }

    /// Catalog metadata for every registered module and script, ordered by
    /// module then script name.
    pub fn catalog(&self) -> Vec<ModuleMetadata> {
        self.modules
            .iter()
            .map(|(module_name, entry)| ModuleMetadata {
                name: module_name.clone(),
                display_name: entry.display_name.clone(),
                description: entry.description.clone(),
                scripts: entry
                    .scripts
                    .iter()
                    .map(|(script_name, script)| ScriptMetadata {
                        module_name: module_name.clone(),
                        name: script_name.clone(),
                        display_name: script.display_name.clone(),
                        description: script.description.clone(),
                        location: format!("scripts/{module_name}/{script_name}"),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Verify every script in `cataloged` resolves to a handler.
    ///
    /// Run at startup against the persisted catalog so stale entries (a
    /// script row whose implementation was removed) fail the boot instead
    /// of a later dispatch.
    pub fn validate_against(&self, cataloged: &[ScriptMetadata]) -> Result<(), MissingHandlers> {
        let missing: Vec<String> = cataloged
            .iter()
            .filter(|s| self.handler(&s.module_name, &s.name).is_none())
            .map(|s| script_scope(&s.module_name, &s.name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MissingHandlers { missing })
        }
    }

    /// The full registry of simulated medical scripts.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register_module(
            "module1",
            "Patient Data Analysis",
            "Analyze patient data and generate reports",
        );
        registry.set_module_handler("module1", crate::scripts::patient_data_analysis);
        registry.register_script(
            "module1",
            "data_validation",
            "Data Validation",
            "Validate patient records for completeness and consistency",
            crate::scripts::data_validation,
        );
        registry.register_script(
            "module1",
            "patient_analysis",
            "Patient Analysis",
            "Analyze patient data and detect anomalies",
            crate::scripts::patient_analysis,
        );
        registry.register_script(
            "module1",
            "report_generation",
            "Report Generation",
            "Generate PDF reports from analysis results",
            crate::scripts::report_generation,
        );

        registry.register_module(
            "module2",
            "Medical Image Processing",
            "Process and analyze medical images",
        );
        registry.set_module_handler("module2", crate::scripts::medical_image_processing);
        registry.register_script(
            "module2",
            "diagnosis_support",
            "Diagnosis Support",
            "Suggest diagnoses from processed imaging data",
            crate::scripts::diagnosis_support,
        );
        registry.register_script(
            "module2",
            "image_processing",
            "Image Processing",
            "Process X-ray, MRI, and CT images",
            crate::scripts::image_processing,
        );

        registry.register_module(
            "module3",
            "Drug Interaction Analysis",
            "Analyze drug interactions and provide recommendations",
        );
        registry.set_module_handler("module3", crate::scripts::drug_interaction_analysis);
        registry.register_script(
            "module3",
            "dosage_calculation",
            "Dosage Calculation",
            "Calculate and safety-check drug dosages",
            crate::scripts::dosage_calculation,
        );
        registry.register_script(
            "module3",
            "drug_interaction",
            "Drug Interaction",
            "Analyze interactions across prescribed drugs",
            crate::scripts::drug_interaction,
        );
        registry.register_script(
            "module3",
            "side_effects_monitor",
            "Side Effects Monitor",
            "Monitor reported side effects by severity",
            crate::scripts::side_effects_monitor,
        );

        registry
    }
}
