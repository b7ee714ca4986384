//! JWT-based authentication extractors for Axum handlers.
//!
//! There are two independent chains: [`AuthEmployee`] accepts only tokens
//! issued by the employee login, [`AuthVisitor`] only those issued by the
//! visitor login. Presenting the wrong kind is treated as unauthenticated.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use warehub_core::error::CoreError;
use warehub_core::roles::{PrincipalKind, Role};
use warehub_core::types::DbId;
use warehub_events::EventActor;

use crate::auth::jwt::{validate_token, Claims};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated employee extracted from a Bearer token.
///
/// ```ignore
/// async fn my_handler(employee: AuthEmployee) -> AppResult<Json<()>> {
///     tracing::info!(employee_id = employee.employee_id, role = %employee.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthEmployee {
    pub employee_id: DbId,
    pub role: Role,
}

/// Authenticated visitor (client or supplier) extracted from a Bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthVisitor {
    pub visitor_id: DbId,
    pub role: Role,
}

impl AuthEmployee {
    pub fn actor(&self) -> EventActor {
        EventActor {
            kind: PrincipalKind::Employee,
            id: self.employee_id,
            role: self.role,
        }
    }
}

impl AuthVisitor {
    pub fn actor(&self) -> EventActor {
        EventActor {
            kind: PrincipalKind::Visitor,
            id: self.visitor_id,
            role: self.role,
        }
    }
}

/// Decode the Bearer token and require the given principal kind.
fn claims_of_kind(
    parts: &Parts,
    state: &AppState,
    kind: PrincipalKind,
) -> Result<(Claims, Role), AppError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })?;

    let claims = validate_token(token, &state.config.jwt).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
    })?;

    if claims.kind != kind {
        return Err(AppError::Core(CoreError::Unauthorized(format!(
            "This endpoint requires a {} token",
            kind.as_str()
        ))));
    }

    let role = Role::from_str_db(&claims.role)
        .ok()
        .filter(|r| r.kind() == kind)
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid token role".into())))?;

    Ok((claims, role))
}

impl FromRequestParts<AppState> for AuthEmployee {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (claims, role) = claims_of_kind(parts, state, PrincipalKind::Employee)?;
        Ok(AuthEmployee {
            employee_id: claims.sub,
            role,
        })
    }
}

impl FromRequestParts<AppState> for AuthVisitor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (claims, role) = claims_of_kind(parts, state, PrincipalKind::Visitor)?;
        Ok(AuthVisitor {
            visitor_id: claims.sub,
            role,
        })
    }
}
