//! Employee account administration.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json, post_json_auth, put_json_auth, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;
use warehub_core::roles::Role;

async fn login_status(app: &axum::Router, login: &str, password: &str) -> StatusCode {
    post_json(
        app.clone(),
        "/api/v1/employee/auth/login",
        json!({ "login": login, "password": password }),
    )
    .await
    .status()
}

fn new_employee(login: &str, role: &str) -> serde_json::Value {
    json!({
        "login": login,
        "email": format!("{login}@Example.com"),
        "password": TEST_PASSWORD,
        "full_name": "Pavel Picker",
        "role": role,
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_manages_employee_accounts(pool: PgPool) {
    let (_, admin) = common::employee_with_token(&pool, "root", Role::Admin).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/employees",
        new_employee("picker", "storekeeper"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["role"], "storekeeper");
    assert_eq!(json["data"]["email"], "picker@example.com");
    assert!(json["data"].get("password_hash").is_none());

    let response = get_auth(app.clone(), "/api/v1/admin/employees", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let uri = format!("/api/v1/admin/employees/{id}");
    let response = put_json_auth(app.clone(), &uri, json!({ "role": "manager" }), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "manager");

    assert_eq!(login_status(&app, "picker", TEST_PASSWORD).await, StatusCode::OK);

    let response = post_json_auth(
        app.clone(),
        &format!("{uri}/reset-password"),
        json!({ "new_password": "Another-Pass-77" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        login_status(&app, "picker", TEST_PASSWORD).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(login_status(&app, "picker", "Another-Pass-77").await, StatusCode::OK);

    let response = delete_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        login_status(&app, "picker", "Another-Pass-77").await,
        StatusCode::FORBIDDEN
    );

    let response = get_auth(app, &uri, &admin).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_active"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn employee_input_is_validated(pool: PgPool) {
    let (_, admin) = common::employee_with_token(&pool, "root", Role::Admin).await;
    let app = common::build_test_app(pool);
    let uri = "/api/v1/admin/employees";

    // Visitor roles are not employee roles.
    let response = post_json_auth(app.clone(), uri, new_employee("buyer", "client"), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut weak = new_employee("picker", "storekeeper");
    weak["password"] = json!("short");
    let response = post_json_auth(app.clone(), uri, weak, &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response =
        post_json_auth(app.clone(), uri, new_employee("picker", "storekeeper"), &admin).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = post_json_auth(app.clone(), uri, new_employee("picker", "driver"), &admin).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        app,
        "/api/v1/admin/employees/9999/reset-password",
        json!({ "new_password": "Another-Pass-77" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_cannot_demote_or_deactivate_self(pool: PgPool) {
    let (me, admin) = common::employee_with_token(&pool, "root", Role::Admin).await;
    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/admin/employees/{}", me.id);

    let response = put_json_auth(app.clone(), &uri, json!({ "role": "manager" }), &admin).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(app.clone(), &uri, json!({ "is_active": false }), &admin).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = delete_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Profile fields are still editable.
    let response =
        put_json_auth(app.clone(), &uri, json!({ "full_name": "Root Admin" }), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["full_name"], "Root Admin");
    assert_eq!(json["data"]["role"], "admin");
    assert_eq!(json["data"]["is_active"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn roles_list_covers_both_principal_kinds(pool: PgPool) {
    let (_, admin) = common::employee_with_token(&pool, "root", Role::Admin).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/roles", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"admin"));
    assert!(names.contains(&"storekeeper"));
    assert!(names.contains(&"client"));
    assert!(names.contains(&"supplier"));
}
