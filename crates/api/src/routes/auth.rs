//! Route definitions for employee authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::employee_auth;
use crate::state::AppState;

/// Routes mounted at `/employee/auth`.
///
/// ```text
/// POST   /login                     -> login (public)
/// POST   /refresh                   -> refresh (public)
/// POST   /logout                    -> logout
/// GET    /me                        -> me
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(employee_auth::login))
        .route("/refresh", post(employee_auth::refresh))
        .route("/logout", post(employee_auth::logout))
        .route("/me", get(employee_auth::me))
}
