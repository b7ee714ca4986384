//! Route definitions for equipment types and equipment items.
//!
//! Warehouse-scoped listing and registration live in [`super::storage`].

use axum::routing::get;
use axum::Router;

use crate::handlers::equipment;
use crate::state::AppState;

/// Routes mounted at `/equipment-types`.
pub fn types_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(equipment::list_types).post(equipment::create_type),
        )
        .route(
            "/{id}",
            get(equipment::get_type)
                .put(equipment::update_type)
                .delete(equipment::delete_type),
        )
}

/// Routes mounted at `/equipment`.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(equipment::get_equipment)
            .put(equipment::update_equipment)
            .delete(equipment::delete_equipment),
    )
}
