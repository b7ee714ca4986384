//! Handlers for `/employee/auth` (login, refresh, logout, me).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use warehub_core::error::CoreError;
use warehub_core::roles::PrincipalKind;
use warehub_db::models::employee::EmployeeResponse;
use warehub_db::repositories::{EmployeeRepo, RoleRepo, SessionRepo};

use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::handlers::session::{
    consume_refresh_token, issue_tokens, AuthResponse, RefreshRequest,
};
use crate::middleware::auth::AuthEmployee;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

/// Request body for `POST /employee/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid login or password".into(),
    ))
}

/// POST /api/v1/employee/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse<EmployeeResponse>>> {
    let employee = EmployeeRepo::find_by_login(&state.pool, input.login.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    if !employee.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = employee.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &employee.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        EmployeeRepo::increment_failed_login(&state.pool, employee.id).await?;

        let new_count = employee.failed_login_count + 1;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            EmployeeRepo::lock_account(&state.pool, employee.id, lock_until).await?;
            tracing::warn!(employee_id = employee.id, %lock_until, "Employee account locked");
        }

        return Err(invalid_credentials());
    }

    EmployeeRepo::record_successful_login(&state.pool, employee.id).await?;

    let role_name = RoleRepo::resolve_name(&state.pool, employee.role_id).await?;
    let id = employee.id;
    tracing::info!(employee_id = id, role = %role_name, "Employee logged in");

    let profile = EmployeeResponse::from_employee(employee, role_name.clone());
    let response = issue_tokens(
        &state,
        PrincipalKind::Employee,
        id,
        &role_name,
        &headers,
        profile,
    )
    .await?;

    Ok(Json(response))
}

/// POST /api/v1/employee/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse<EmployeeResponse>>> {
    let session =
        consume_refresh_token(&state, PrincipalKind::Employee, &input.refresh_token).await?;

    let employee = EmployeeRepo::find_by_id(&state.pool, session.principal_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Employee no longer exists".into()))
        })?;

    if !employee.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let role_name = RoleRepo::resolve_name(&state.pool, employee.role_id).await?;
    let id = employee.id;
    let profile = EmployeeResponse::from_employee(employee, role_name.clone());
    let response = issue_tokens(
        &state,
        PrincipalKind::Employee,
        id,
        &role_name,
        &headers,
        profile,
    )
    .await?;

    Ok(Json(response))
}

/// POST /api/v1/employee/auth/logout
///
/// Revoke all sessions of the authenticated employee. Returns 204 No Content.
pub async fn logout(
    State(state): State<AppState>,
    employee: AuthEmployee,
) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for(
        &state.pool,
        PrincipalKind::Employee.as_str(),
        employee.employee_id,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/employee/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthEmployee,
) -> AppResult<Json<DataResponse<EmployeeResponse>>> {
    let employee = EmployeeRepo::find_by_id(&state.pool, auth.employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee", auth.employee_id))?;
    let role_name = RoleRepo::resolve_name(&state.pool, employee.role_id).await?;
    Ok(Json(DataResponse {
        data: EmployeeResponse::from_employee(employee, role_name),
    }))
}
