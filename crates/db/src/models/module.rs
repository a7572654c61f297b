//! Module catalog entity model.

use serde::Serialize;
use sqlx::FromRow;
use zeus_core::types::Timestamp;

/// A row from the `modules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Module {
    pub name: String,
    pub display_name: String,
    pub description: String,
    #[serde(skip)]
    pub created_at: Timestamp,
    #[serde(skip)]
    pub updated_at: Timestamp,
}
