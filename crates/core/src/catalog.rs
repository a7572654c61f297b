//! Catalog metadata describing what the execution backend can run.
//!
//! A module groups related scripts; identity of a script is the
//! `(module, script)` pair. These are the records the registry publishes
//! and the database mirrors at startup.

use serde::{Deserialize, Serialize};

/// Metadata for one executable script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptMetadata {
    /// Owning module, e.g. `"module1"`.
    pub module_name: String,
    /// Script name within the module, e.g. `"patient_analysis"`.
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// Where the implementation lives, e.g. `"scripts/module1/patient_analysis"`.
    pub location: String,
}

/// Metadata for a module and the scripts it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub scripts: Vec<ScriptMetadata>,
}
