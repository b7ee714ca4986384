//! Handlers for `/visitor/auth`: self-registration with an e-mailed code,
//! login, refresh, logout and me.
//!
//! Registration never creates a visitor directly. It stores a pending row
//! holding the hashed password and the hashed code; only a correct code
//! turns it into an account.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use warehub_core::error::CoreError;
use warehub_core::otp::{self, VerificationState};
use warehub_core::roles::{validate_visitor_role, PrincipalKind};
use warehub_core::types::Timestamp;
use warehub_core::validation::{normalize_email, validate_name};
use warehub_db::models::visitor::{CreateVerification, Verification, VisitorResponse};
use warehub_db::repositories::{RoleRepo, SessionRepo, VerificationRepo, VisitorRepo};

use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::handlers::session::{
    consume_refresh_token, issue_tokens, AuthResponse, RefreshRequest,
};
use crate::middleware::auth::AuthVisitor;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// `client` or `supplier`.
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of the 202 answer to `register` and `resend`.
#[derive(Debug, Serialize)]
pub struct PendingVerification {
    pub email: String,
    pub expires_at: Timestamp,
}

fn state_of(v: &Verification, max_attempts: i32) -> VerificationState {
    VerificationState {
        attempts: v.attempts,
        max_attempts,
        expires_at: v.expires_at,
        sent_at: v.sent_at,
    }
}

fn no_pending_registration() -> AppError {
    AppError::Core(CoreError::Validation(
        "No pending registration for this e-mail".into(),
    ))
}

fn attempts_exhausted() -> AppError {
    AppError::Core(CoreError::Forbidden(
        "Too many incorrect codes. Request a new one.".into(),
    ))
}

async fn send_code(state: &AppState, email: &str, code: &str) -> AppResult<()> {
    let body = format!(
        "Your Warehub verification code is {code}.\n\
         It expires in {} minutes.",
        state.config.otp_expiry_mins
    );
    state
        .mailer
        .send(email, "Warehub verification code", &body)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to send verification code: {e}")))
}

/// POST /api/v1/visitor/auth/register
///
/// Starts (or restarts) a registration and mails a code. Returns 202.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PendingVerification>>)> {
    let email = normalize_email(&input.email)?;
    validate_name("Full name", &input.full_name)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let role = validate_visitor_role(&input.role)?;

    if VisitorRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this e-mail already exists".into(),
        )));
    }

    let now = Utc::now();
    if let Some(pending) = VerificationRepo::find_by_email(&state.pool, &email).await? {
        state_of(&pending, state.config.otp_max_attempts).check_resend(now)?;
    }

    let role_row = RoleRepo::find_by_name(&state.pool, role.as_str())
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role '{role}' is not seeded")))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let code = otp::generate_code();
    let expires_at = now + chrono::Duration::minutes(state.config.otp_expiry_mins);
    let pending = VerificationRepo::upsert(
        &state.pool,
        &CreateVerification {
            email: email.clone(),
            code_hash: otp::hash_code(&email, &code),
            password_hash,
            full_name: input.full_name.trim().to_string(),
            phone: input.phone,
            role_id: role_row.id,
            expires_at,
        },
    )
    .await?;

    send_code(&state, &email, &code).await?;
    tracing::info!(verification_id = pending.id, role = %role, "Visitor registration started");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: PendingVerification {
                email,
                expires_at: pending.expires_at,
            },
        }),
    ))
}

/// POST /api/v1/visitor/auth/verify
///
/// Exchanges a correct code for an account and a token pair. Returns 201.
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<VerifyRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse<VisitorResponse>>)> {
    let email = normalize_email(&input.email)?;
    let pending = VerificationRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(no_pending_registration)?;

    state_of(&pending, state.config.otp_max_attempts).check(Utc::now())?;

    // The attempt is spent before the code is compared.
    let claimed =
        VerificationRepo::claim_attempt(&state.pool, pending.id, state.config.otp_max_attempts)
            .await?
            .ok_or_else(attempts_exhausted)?;

    if otp::hash_code(&email, &input.code) != claimed.code_hash {
        tracing::debug!(
            verification_id = claimed.id,
            attempts = claimed.attempts,
            "Incorrect verification code"
        );
        return Err(AppError::Core(CoreError::Validation(
            "Incorrect verification code".into(),
        )));
    }

    let visitor = VisitorRepo::create_from_verification(&state.pool, pending.id).await?;
    let role_name = RoleRepo::resolve_name(&state.pool, visitor.role_id).await?;
    let id = visitor.id;
    tracing::info!(visitor_id = id, role = %role_name, "Visitor registered");

    let profile = VisitorResponse::from_visitor(visitor, role_name.clone());
    let response = issue_tokens(
        &state,
        PrincipalKind::Visitor,
        id,
        &role_name,
        &headers,
        profile,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/visitor/auth/resend
pub async fn resend(
    State(state): State<AppState>,
    Json(input): Json<ResendRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PendingVerification>>)> {
    let email = normalize_email(&input.email)?;
    let pending = VerificationRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(no_pending_registration)?;

    let now = Utc::now();
    state_of(&pending, state.config.otp_max_attempts).check_resend(now)?;

    let code = otp::generate_code();
    let expires_at = now + chrono::Duration::minutes(state.config.otp_expiry_mins);
    VerificationRepo::refresh_code(
        &state.pool,
        pending.id,
        &otp::hash_code(&email, &code),
        expires_at,
    )
    .await?;

    send_code(&state, &email, &code).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: PendingVerification { email, expires_at },
        }),
    ))
}

/// POST /api/v1/visitor/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse<VisitorResponse>>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid e-mail or password".into()));

    let email = input.email.trim().to_lowercase();
    let visitor = VisitorRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    if !visitor.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &visitor.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    VisitorRepo::record_login(&state.pool, visitor.id).await?;

    let role_name = RoleRepo::resolve_name(&state.pool, visitor.role_id).await?;
    let id = visitor.id;
    let profile = VisitorResponse::from_visitor(visitor, role_name.clone());
    let response = issue_tokens(
        &state,
        PrincipalKind::Visitor,
        id,
        &role_name,
        &headers,
        profile,
    )
    .await?;

    Ok(Json(response))
}

/// POST /api/v1/visitor/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse<VisitorResponse>>> {
    let session =
        consume_refresh_token(&state, PrincipalKind::Visitor, &input.refresh_token).await?;

    let visitor = VisitorRepo::find_by_id(&state.pool, session.principal_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Visitor no longer exists".into()))
        })?;

    if !visitor.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let role_name = RoleRepo::resolve_name(&state.pool, visitor.role_id).await?;
    let id = visitor.id;
    let profile = VisitorResponse::from_visitor(visitor, role_name.clone());
    let response = issue_tokens(
        &state,
        PrincipalKind::Visitor,
        id,
        &role_name,
        &headers,
        profile,
    )
    .await?;

    Ok(Json(response))
}

/// POST /api/v1/visitor/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    visitor: AuthVisitor,
) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for(
        &state.pool,
        PrincipalKind::Visitor.as_str(),
        visitor.visitor_id,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/visitor/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthVisitor,
) -> AppResult<Json<DataResponse<VisitorResponse>>> {
    let visitor = VisitorRepo::find_by_id(&state.pool, auth.visitor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Visitor", auth.visitor_id))?;
    let role_name = RoleRepo::resolve_name(&state.pool, visitor.role_id).await?;
    Ok(Json(DataResponse {
        data: VisitorResponse::from_visitor(visitor, role_name),
    }))
}
