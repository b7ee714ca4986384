//! Employee entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

/// Full employee row from the `employees` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`EmployeeResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Employee {
    pub id: DbId,
    pub login: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role_id: DbId,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe employee representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeResponse {
    pub id: DbId,
    pub login: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// Resolved role name (e.g. `"storekeeper"`).
    pub role: String,
    pub role_id: DbId,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl EmployeeResponse {
    pub fn from_employee(e: Employee, role: String) -> Self {
        Self {
            id: e.id,
            login: e.login,
            email: e.email,
            full_name: e.full_name,
            phone: e.phone,
            role,
            role_id: e.role_id,
            is_active: e.is_active,
            last_login_at: e.last_login_at,
            created_at: e.created_at,
        }
    }
}

/// DTO for creating a new employee. The password is already hashed.
#[derive(Debug)]
pub struct CreateEmployee {
    pub login: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role_id: DbId,
}

/// DTO for updating an existing employee. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEmployee {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<DbId>,
    pub is_active: Option<bool>,
}
