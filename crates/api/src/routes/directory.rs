//! Route definitions for `/clients` and `/suppliers`.

use axum::routing::get;
use axum::Router;

use crate::handlers::directory;
use crate::state::AppState;

/// Routes mounted at `/clients`.
///
/// ```text
/// GET    /                          -> list_clients (?q=)
/// POST   /                          -> create_client
/// GET    /{id}                      -> get_client
/// PUT    /{id}                      -> update_client
/// DELETE /{id}                      -> delete_client
/// ```
pub fn clients_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(directory::list_clients).post(directory::create_client),
        )
        .route(
            "/{id}",
            get(directory::get_client)
                .put(directory::update_client)
                .delete(directory::delete_client),
        )
}

/// Routes mounted at `/suppliers`; same shape as [`clients_router`].
pub fn suppliers_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(directory::list_suppliers).post(directory::create_supplier),
        )
        .route(
            "/{id}",
            get(directory::get_supplier)
                .put(directory::update_supplier)
                .delete(directory::delete_supplier),
        )
}
