//! Visitor accounts and pending e-mail verifications.

use serde::Serialize;
use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

/// Full visitor row. Contains the password hash; use [`VisitorResponse`]
/// for API output.
#[derive(Debug, Clone, FromRow)]
pub struct Visitor {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role_id: DbId,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitorResponse {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl VisitorResponse {
    pub fn from_visitor(v: Visitor, role: String) -> Self {
        Self {
            id: v.id,
            email: v.email,
            full_name: v.full_name,
            phone: v.phone,
            role,
            is_active: v.is_active,
            created_at: v.created_at,
        }
    }
}

/// A pending self-registration from `visitor_verifications`.
#[derive(Debug, Clone, FromRow)]
pub struct Verification {
    pub id: DbId,
    pub email: String,
    pub code_hash: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role_id: DbId,
    pub attempts: i32,
    pub expires_at: Timestamp,
    pub sent_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for starting (or restarting) a registration.
#[derive(Debug)]
pub struct CreateVerification {
    pub email: String,
    pub code_hash: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role_id: DbId,
    pub expires_at: Timestamp,
}
