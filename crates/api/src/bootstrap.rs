//! First-run seeding of the initial administrator.
//!
//! When the `employees` table is empty and both `BOOTSTRAP_ADMIN_LOGIN` and
//! `BOOTSTRAP_ADMIN_PASSWORD` are set, an `admin` account is created so the
//! rest of the staff can be added through `/admin/employees`.

use warehub_core::error::CoreError;
use warehub_core::roles::Role;
use warehub_db::models::employee::CreateEmployee;
use warehub_db::repositories::{EmployeeRepo, RoleRepo};
use warehub_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};

/// Credentials for the seeded administrator.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub login: String,
    pub password: String,
    pub email: String,
}

impl BootstrapAdmin {
    /// Read `BOOTSTRAP_ADMIN_LOGIN`, `BOOTSTRAP_ADMIN_PASSWORD` and the
    /// optional `BOOTSTRAP_ADMIN_EMAIL`. Returns `None` unless both
    /// required variables are set.
    pub fn from_env() -> Option<Self> {
        let login = std::env::var("BOOTSTRAP_ADMIN_LOGIN").ok()?;
        let password = std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok()?;
        let email = std::env::var("BOOTSTRAP_ADMIN_EMAIL")
            .unwrap_or_else(|_| format!("{login}@localhost.local"));
        Some(Self {
            login,
            password,
            email,
        })
    }
}

/// Create the administrator if no employee exists yet.
///
/// Returns `true` when an account was created.
pub async fn seed_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<bool> {
    if EmployeeRepo::count(pool).await? > 0 {
        return Ok(false);
    }

    validate_password_strength(&admin.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let role = RoleRepo::find_by_name(pool, Role::Admin.as_str())
        .await?
        .ok_or_else(|| AppError::InternalError("Role 'admin' is not seeded".into()))?;

    let employee = EmployeeRepo::create(
        pool,
        &CreateEmployee {
            login: admin.login.trim().to_string(),
            email: admin.email.trim().to_lowercase(),
            password_hash,
            full_name: "Administrator".into(),
            phone: None,
            role_id: role.id,
        },
    )
    .await?;

    tracing::info!(employee_id = employee.id, login = %employee.login, "Bootstrap administrator created");
    Ok(true)
}
