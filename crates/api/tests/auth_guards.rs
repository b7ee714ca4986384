//! Authentication and role checks that reject a request before any
//! database access. The pool is lazy and never connects.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, employee_token, get, get_auth, post_json_auth, token_for,
};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use warehub_core::roles::{PrincipalKind, Role};

fn lazy_app() -> axum::Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://nobody@127.0.0.1:1/unused")
        .expect("lazy pool should be created");
    common::build_test_app(pool)
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let response = get(lazy_app(), "/api/v1/warehouses").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let response = get_auth(lazy_app(), "/api/v1/warehouses", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn visitor_token_is_refused_on_employee_routes() {
    let token = token_for(PrincipalKind::Visitor, 1, Role::Client);
    let response = get_auth(lazy_app(), "/api/v1/orders", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn employee_token_is_refused_on_visitor_routes() {
    let token = employee_token(1, Role::Admin);
    let response = get_auth(lazy_app(), "/api/v1/visitor/orders", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn driver_cannot_create_warehouses() {
    let token = employee_token(1, Role::Driver);
    let body = json!({ "name": "Main", "address": "1 Dock Road" });
    let response = post_json_auth(lazy_app(), "/api/v1/warehouses", body, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn only_admin_reaches_employee_administration() {
    for role in [Role::Director, Role::Manager, Role::Storekeeper] {
        let token = employee_token(1, role);
        let response = get_auth(lazy_app(), "/api/v1/admin/employees", &token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "role {role}");
    }
}

#[tokio::test]
async fn storekeeper_cannot_decide_write_offs() {
    let token = employee_token(1, Role::Storekeeper);
    let response = post_json_auth(
        lazy_app(),
        "/api/v1/write-off-acts/1/approve",
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn client_cannot_use_supplier_routes() {
    let token = token_for(PrincipalKind::Visitor, 1, Role::Client);
    let response = get_auth(lazy_app(), "/api/v1/visitor/delivery-requests", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_drivers_have_a_task_list() {
    let token = employee_token(1, Role::Admin);
    let response = get_auth(lazy_app(), "/api/v1/driver/tasks", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
