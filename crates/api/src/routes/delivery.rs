//! Route definitions for vehicles, delivery tasks and route points.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::delivery;
use crate::state::AppState;

/// Routes mounted at `/vehicles`.
pub fn vehicles_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(delivery::list_vehicles).post(delivery::create_vehicle),
        )
        .route(
            "/{id}",
            get(delivery::get_vehicle)
                .put(delivery::update_vehicle)
                .delete(delivery::delete_vehicle),
        )
}

/// Routes mounted at `/delivery-tasks`.
///
/// ```text
/// GET    /                          -> list_tasks
/// POST   /                          -> create_task
/// GET    /{id}                      -> get_task
/// PUT    /{id}                      -> update_task
/// POST   /{id}/status               -> change_task_status
/// POST   /{id}/route-points         -> add_route_point
/// PUT    /{id}/route-points/order   -> reorder_route_points
/// POST   /{id}/ttn                  -> issue_ttn
/// GET    /{id}/ttn                  -> get_ttn
/// ```
pub fn tasks_router() -> Router<AppState> {
    Router::new()
        .route("/", get(delivery::list_tasks).post(delivery::create_task))
        .route("/{id}", get(delivery::get_task).put(delivery::update_task))
        .route("/{id}/status", post(delivery::change_task_status))
        .route("/{id}/route-points", post(delivery::add_route_point))
        .route(
            "/{id}/route-points/order",
            put(delivery::reorder_route_points),
        )
        .route("/{id}/ttn", get(delivery::get_ttn).post(delivery::issue_ttn))
}

/// Routes mounted at `/route-points`.
pub fn route_points_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(delivery::delete_route_point))
        .route("/{id}/visit", post(delivery::visit_route_point))
}

/// Routes mounted at `/driver`.
pub fn driver_router() -> Router<AppState> {
    Router::new().route("/tasks", get(delivery::driver_tasks))
}
