//! Two-level permission model: coarse module grants and fine script grants.
//!
//! A script grant is written as the dotted scope `module.script`. The two
//! layers are independent: holding a module grant does NOT imply any script
//! grant beneath it, and vice versa. Script-scoped dispatch requires both.
//! Absence of an explicit grant is always a denial.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Render the dotted scope string for a script grant.
pub fn script_scope(module: &str, script: &str) -> String {
    format!("{module}.{script}")
}

/// A principal's permission snapshot.
///
/// Backed by ordered sets so serialized snapshots (and listings derived
/// from them) are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Module-level grants, e.g. `"module1"`.
    pub modules: BTreeSet<String>,
    /// Script-level grants in dotted form, e.g. `"module1.patient_analysis"`.
    pub scripts: BTreeSet<String>,
}

impl PermissionSet {
    /// Build a snapshot from module names and `(module, script)` pairs.
    pub fn new<M, S>(modules: M, scripts: S) -> Self
    where
        M: IntoIterator<Item = String>,
        S: IntoIterator<Item = (String, String)>,
    {
        Self {
            modules: modules.into_iter().collect(),
            scripts: scripts
                .into_iter()
                .map(|(m, s)| script_scope(&m, &s))
                .collect(),
        }
    }

    /// True iff the module-level grant is present.
    pub fn allows_module(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    /// True iff the script-level grant is present.
    ///
    /// Checks only the script layer; callers enforcing script-scoped
    /// dispatch must check [`allows_module`](Self::allows_module) as well.
    pub fn allows_script(&self, module: &str, script: &str) -> bool {
        self.scripts.contains(&script_scope(module, script))
    }
}
