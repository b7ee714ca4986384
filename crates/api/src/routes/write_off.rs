//! Route definitions for `/write-off-acts`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::write_off;
use crate::state::AppState;

/// Routes mounted at `/write-off-acts`.
///
/// ```text
/// GET    /                          -> list_acts (?status=)
/// POST   /                          -> create_act
/// GET    /{id}                      -> get_act
/// POST   /{id}/approve              -> approve_act
/// POST   /{id}/reject               -> reject_act
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(write_off::list_acts).post(write_off::create_act))
        .route("/{id}", get(write_off::get_act))
        .route("/{id}/approve", post(write_off::approve_act))
        .route("/{id}/reject", post(write_off::reject_act))
}
