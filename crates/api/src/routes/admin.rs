//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /employees                       -> list_employees
/// POST   /employees                       -> create_employee
/// GET    /employees/{id}                  -> get_employee
/// PUT    /employees/{id}                  -> update_employee
/// DELETE /employees/{id}                  -> deactivate_employee
/// POST   /employees/{id}/reset-password   -> reset_password
/// GET    /roles                           -> list_roles
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/employees",
            get(admin::list_employees).post(admin::create_employee),
        )
        .route(
            "/employees/{id}",
            get(admin::get_employee)
                .put(admin::update_employee)
                .delete(admin::deactivate_employee),
        )
        .route(
            "/employees/{id}/reset-password",
            post(admin::reset_password),
        )
        .route("/roles", get(admin::list_roles))
}
