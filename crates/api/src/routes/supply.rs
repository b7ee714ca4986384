//! Route definitions for the employee side of supplier requests.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::supply;
use crate::state::AppState;

/// Routes mounted at `/delivery-requests`.
///
/// ```text
/// GET    /                          -> list_requests
/// POST   /                          -> create_request
/// GET    /{id}                      -> get_request
/// POST   /{id}/status               -> change_request_status
/// GET    /{id}/acceptance-act       -> get_acceptance_act
/// POST   /{id}/acceptance-act       -> create_acceptance_act
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(supply::list_requests).post(supply::create_request),
        )
        .route("/{id}", get(supply::get_request))
        .route("/{id}/status", post(supply::change_request_status))
        .route(
            "/{id}/acceptance-act",
            get(supply::get_acceptance_act).post(supply::create_acceptance_act),
        )
}

/// Routes mounted at `/supplies`.
pub fn supplies_router() -> Router<AppState> {
    Router::new().route("/", get(supply::list_supplies))
}
