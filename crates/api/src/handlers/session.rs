//! Token issuing shared by the employee and visitor login chains.

use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use warehub_core::roles::PrincipalKind;
use warehub_core::types::DbId;
use warehub_db::models::session::{CreateSession, Session};
use warehub_db::repositories::SessionRepo;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for the `refresh` endpoints.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by login, refresh and
/// visitor verification.
#[derive(Debug, Serialize)]
pub struct AuthResponse<P: Serialize> {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub profile: P,
}

/// Generate access + refresh tokens, persist a session row, and build the
/// response around `profile`.
pub async fn issue_tokens<P: Serialize>(
    state: &AppState,
    kind: PrincipalKind,
    principal_id: DbId,
    role: &str,
    headers: &HeaderMap,
    profile: P,
) -> AppResult<AuthResponse<P>> {
    let access_token = generate_access_token(kind, principal_id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.chars().take(255).collect());

    let session_input = CreateSession {
        principal_kind: kind.as_str().to_string(),
        principal_id,
        refresh_token_hash: refresh_hash,
        expires_at,
        user_agent,
    };
    SessionRepo::create(&state.pool, &session_input).await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        profile,
    })
}

/// Look up and revoke the session a refresh token belongs to (rotation).
///
/// Tokens of the other principal kind are treated as unknown.
pub async fn consume_refresh_token(
    state: &AppState,
    kind: PrincipalKind,
    refresh_token: &str,
) -> AppResult<Session> {
    let token_hash = hash_refresh_token(refresh_token);

    let session = SessionRepo::find_active(&state.pool, kind.as_str(), &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(warehub_core::error::CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    SessionRepo::revoke(&state.pool, session.id).await?;
    Ok(session)
}
