//! Stand-in execution backend.
//!
//! Provides the [`registry::ScriptRegistry`] (the static mapping from
//! `(module, script)` to a handler function, and the gateway's catalog
//! source), the simulated medical scripts, and [`local::LocalJobQueue`],
//! an in-process `JobQueue` used when no remote queue service is
//! configured.

pub mod local;
pub mod registry;
pub mod scripts;
