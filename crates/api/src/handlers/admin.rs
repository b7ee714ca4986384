//! Handlers for the `/admin` resource (employee accounts and roles).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use warehub_core::error::CoreError;
use warehub_core::roles::{validate_employee_role, PrincipalKind};
use warehub_core::types::DbId;
use warehub_core::validation::{normalize_email, validate_name};
use warehub_db::models::employee::{CreateEmployee, Employee, EmployeeResponse, UpdateEmployee};
use warehub_db::models::role::Role as RoleRow;
use warehub_db::repositories::{EmployeeRepo, RoleRepo, SessionRepo};

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/employees`.
#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub login: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// Employee role name, e.g. `"storekeeper"`.
    pub role: String,
}

/// Request body for `PUT /admin/employees/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /admin/employees/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/employees
pub async fn create_employee(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateEmployeeRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<EmployeeResponse>>)> {
    let login = input.login.trim().to_string();
    validate_name("Login", &login)?;
    validate_name("Full name", &input.full_name)?;
    let email = normalize_email(&input.email)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let role = resolve_employee_role(&state, &input.role).await?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let employee = EmployeeRepo::create(
        &state.pool,
        &CreateEmployee {
            login,
            email,
            password_hash: hashed,
            full_name: input.full_name.trim().to_string(),
            phone: input.phone,
            role_id: role.id,
        },
    )
    .await?;

    tracing::info!(
        employee_id = employee.id,
        role = %role.name,
        created_by = admin.employee_id,
        "Employee created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: EmployeeResponse::from_employee(employee, role.name),
        }),
    ))
}

/// GET /api/v1/admin/employees
///
/// List all employees with resolved role names.
pub async fn list_employees(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<EmployeeResponse>>>> {
    let employees = EmployeeRepo::list(&state.pool).await?;

    // Pre-fetch all roles to avoid N+1 queries.
    let roles = RoleRepo::list(&state.pool).await?;

    let data = employees
        .into_iter()
        .map(|e| {
            let role_name = roles
                .iter()
                .find(|r| r.id == e.role_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            EmployeeResponse::from_employee(e, role_name)
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/employees/{id}
pub async fn get_employee(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EmployeeResponse>>> {
    let employee = EmployeeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee", id))?;

    Ok(Json(DataResponse {
        data: to_response(&state, employee).await?,
    }))
}

/// PUT /api/v1/admin/employees/{id}
///
/// Update profile fields and role (not the password).
pub async fn update_employee(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEmployeeRequest>,
) -> AppResult<Json<DataResponse<EmployeeResponse>>> {
    if let Some(name) = &input.full_name {
        validate_name("Full name", name)?;
    }
    let email = input.email.as_deref().map(normalize_email).transpose()?;
    let role_id = match &input.role {
        Some(name) => Some(resolve_employee_role(&state, name).await?.id),
        None => None,
    };

    if id == admin.employee_id && (input.is_active == Some(false) || role_id.is_some()) {
        return Err(AppError::Core(CoreError::Conflict(
            "Administrators cannot demote or deactivate themselves".into(),
        )));
    }

    let employee = EmployeeRepo::update(
        &state.pool,
        id,
        &UpdateEmployee {
            email,
            full_name: input.full_name.map(|n| n.trim().to_string()),
            phone: input.phone,
            role_id,
            is_active: input.is_active,
        },
    )
    .await?
    .ok_or_else(|| AppError::not_found("Employee", id))?;

    if !employee.is_active {
        SessionRepo::revoke_all_for(&state.pool, PrincipalKind::Employee.as_str(), id).await?;
    }

    Ok(Json(DataResponse {
        data: to_response(&state, employee).await?,
    }))
}

/// DELETE /api/v1/admin/employees/{id}
///
/// Soft-deactivate an employee and revoke their sessions. Returns 204.
pub async fn deactivate_employee(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.employee_id {
        return Err(AppError::Core(CoreError::Conflict(
            "Administrators cannot deactivate themselves".into(),
        )));
    }
    if !EmployeeRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::not_found("Employee", id));
    }
    let revoked =
        SessionRepo::revoke_all_for(&state.pool, PrincipalKind::Employee.as_str(), id).await?;
    tracing::info!(employee_id = id, revoked, "Employee deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/employees/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !EmployeeRepo::update_password(&state.pool, id, &hashed).await? {
        return Err(AppError::not_found("Employee", id));
    }
    SessionRepo::revoke_all_for(&state.pool, PrincipalKind::Employee.as_str(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<RoleRow>>>> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn resolve_employee_role(state: &AppState, name: &str) -> AppResult<RoleRow> {
    let role = validate_employee_role(name.trim())?;
    RoleRepo::find_by_name(&state.pool, role.as_str())
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role '{role}' is not seeded")))
}

async fn to_response(state: &AppState, employee: Employee) -> AppResult<EmployeeResponse> {
    let role_name = RoleRepo::resolve_name(&state.pool, employee.role_id).await?;
    Ok(EmployeeResponse::from_employee(employee, role_name))
}
