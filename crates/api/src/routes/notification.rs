//! Route definitions for the employee `/notifications` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                          -> list_employee
/// POST   /read-all                  -> read_all_employee
/// GET    /unread-count              -> unread_employee
/// POST   /{id}/read                 -> read_employee
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_employee))
        .route("/read-all", post(notification::read_all_employee))
        .route("/unread-count", get(notification::unread_employee))
        .route("/{id}/read", post(notification::read_employee))
}
