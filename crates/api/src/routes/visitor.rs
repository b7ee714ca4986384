//! Route definitions for the visitor (client and supplier) surface.
//!
//! Everything here accepts only visitor tokens; employee tokens are
//! rejected by the extractors with 401.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{catalog, directory, notification, orders, supply, visitor_auth};
use crate::state::AppState;

/// Routes mounted at `/visitor`.
///
/// ```text
/// POST   /auth/register                     -> register (public)
/// POST   /auth/verify                       -> verify (public)
/// POST   /auth/resend                       -> resend (public)
/// POST   /auth/login                        -> login (public)
/// POST   /auth/refresh                      -> refresh (public)
/// POST   /auth/logout                       -> logout
/// GET    /auth/me                           -> me
///
/// GET    /profile                           -> get_profile
/// PUT    /profile                           -> put_profile
///
/// GET    /catalog                           -> visitor_catalog
/// GET    /catalog/{id}                      -> visitor_catalog_item
///
/// GET    /orders                            -> list_own_orders (client)
/// POST   /orders                            -> create_order (client)
/// GET    /orders/{id}                       -> get_own_order
/// POST   /orders/{id}/cancel                -> cancel_own_order
/// GET    /orders/{id}/comments              -> list_own_comments
/// POST   /orders/{id}/comments              -> add_own_comment
///
/// GET    /delivery-requests                 -> list_own_requests (supplier)
/// GET    /delivery-requests/{id}            -> get_own_request
/// POST   /delivery-requests/{id}/status     -> change_own_request_status
///
/// GET    /notifications                     -> list_visitor
/// POST   /notifications/read-all            -> read_all_visitor
/// GET    /notifications/unread-count        -> unread_visitor
/// POST   /notifications/{id}/read           -> read_visitor
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/register", post(visitor_auth::register))
        .route("/auth/verify", post(visitor_auth::verify))
        .route("/auth/resend", post(visitor_auth::resend))
        .route("/auth/login", post(visitor_auth::login))
        .route("/auth/refresh", post(visitor_auth::refresh))
        .route("/auth/logout", post(visitor_auth::logout))
        .route("/auth/me", get(visitor_auth::me))
        // Profile
        .route(
            "/profile",
            get(directory::get_profile).put(directory::put_profile),
        )
        // Catalog
        .route("/catalog", get(catalog::visitor_catalog))
        .route("/catalog/{id}", get(catalog::visitor_catalog_item))
        // Orders (clients)
        .route(
            "/orders",
            get(orders::list_own_orders).post(orders::create_order),
        )
        .route("/orders/{id}", get(orders::get_own_order))
        .route("/orders/{id}/cancel", post(orders::cancel_own_order))
        .route(
            "/orders/{id}/comments",
            get(orders::list_own_comments).post(orders::add_own_comment),
        )
        // Requests for delivery (suppliers)
        .route("/delivery-requests", get(supply::list_own_requests))
        .route("/delivery-requests/{id}", get(supply::get_own_request))
        .route(
            "/delivery-requests/{id}/status",
            post(supply::change_own_request_status),
        )
        // Notifications
        .route("/notifications", get(notification::list_visitor))
        .route("/notifications/read-all", post(notification::read_all_visitor))
        .route("/notifications/unread-count", get(notification::unread_visitor))
        .route("/notifications/{id}/read", post(notification::read_visitor))
}
