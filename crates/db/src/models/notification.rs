//! In-app notifications addressed to an employee or a visitor.

use serde::Serialize;
use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient_kind: String,
    pub recipient_id: DbId,
    pub title: String,
    pub body: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub is_read: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub recipient_kind: String,
    pub recipient_id: DbId,
    pub title: String,
    pub body: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
}
