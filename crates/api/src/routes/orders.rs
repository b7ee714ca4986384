//! Route definitions for the employee side of `/orders`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// GET    /                          -> list_orders (?status=&client_id=)
/// GET    /{id}                      -> get_order
/// POST   /{id}/status               -> change_order_status
/// GET    /{id}/comments             -> list_comments
/// POST   /{id}/comments             -> add_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_orders))
        .route("/{id}", get(orders::get_order))
        .route("/{id}/status", post(orders::change_order_status))
        .route(
            "/{id}/comments",
            get(orders::list_comments).post(orders::add_comment),
        )
}
