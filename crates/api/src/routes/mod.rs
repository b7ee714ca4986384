pub mod admin;
pub mod auth;
pub mod catalog;
pub mod delivery;
pub mod directory;
pub mod equipment;
pub mod health;
pub mod notification;
pub mod orders;
pub mod storage;
pub mod supply;
pub mod visitor;
pub mod write_off;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /employee/auth/...                        employee login, refresh, logout, me
/// /admin/employees, /admin/roles            staff accounts (admin)
///
/// /clients, /suppliers                      counterparties
/// /product-categories, /products            catalog, attributes, image upload
/// /warehouses, /shelves, /storage-zones     storage hierarchy and occupancy
/// /zone-products/{id}                       stock lines
/// /equipment-types, /equipment              equipment
///
/// /orders                                   client orders (employee side)
/// /vehicles, /delivery-tasks, /route-points delivery planning
/// /driver/tasks                             the calling driver's tasks
/// /delivery-requests, /supplies             supplier requests
/// /write-off-acts                           write-offs
/// /notifications                            employee notifications
///
/// /visitor/...                              client and supplier surface
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/employee/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/clients", directory::clients_router())
        .nest("/suppliers", directory::suppliers_router())
        .nest("/product-categories", catalog::categories_router())
        .nest("/products", catalog::products_router())
        .merge(storage::router())
        .nest("/equipment-types", equipment::types_router())
        .nest("/equipment", equipment::router())
        .nest("/orders", orders::router())
        .nest("/vehicles", delivery::vehicles_router())
        .nest("/delivery-tasks", delivery::tasks_router())
        .nest("/route-points", delivery::route_points_router())
        .nest("/driver", delivery::driver_router())
        .nest("/delivery-requests", supply::router())
        .nest("/supplies", supply::supplies_router())
        .nest("/write-off-acts", write_off::router())
        .nest("/notifications", notification::router())
        .nest("/visitor", visitor::router())
}
