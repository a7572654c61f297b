//! Script catalog entity model.

use serde::Serialize;
use sqlx::FromRow;
use zeus_core::types::{DbId, Timestamp};

/// A row from the `scripts` table. Identity is `(module_name, name)`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Script {
    pub id: DbId,
    pub module_name: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub location: String,
    #[serde(skip)]
    pub created_at: Timestamp,
    #[serde(skip)]
    pub updated_at: Timestamp,
}
