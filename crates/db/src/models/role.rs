//! Role lookup table.

use serde::Serialize;
use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

/// A row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    /// `employee` or `visitor`.
    pub kind: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
