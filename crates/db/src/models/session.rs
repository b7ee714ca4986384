//! Refresh-token sessions for both principal kinds.

use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    /// `employee` or `visitor`.
    pub principal_kind: String,
    pub principal_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateSession {
    pub principal_kind: String,
    pub principal_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
}
