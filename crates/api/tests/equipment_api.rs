//! Equipment types and warehouse equipment.

mod common;

use axum::http::StatusCode;
use common::{body_json, created_id, delete_auth, get_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;
use warehub_core::roles::Role;

#[sqlx::test(migrations = "../db/migrations")]
async fn equipment_lifecycle(pool: PgPool) {
    let (_, admin) = common::employee_with_token(&pool, "root", Role::Admin).await;
    let (_, keeper) = common::employee_with_token(&pool, "keeper", Role::Storekeeper).await;
    let (_, driver) = common::employee_with_token(&pool, "driver", Role::Driver).await;
    let app = common::build_test_app(pool);

    // Only admins maintain the type catalogue.
    let response = post_json_auth(
        app.clone(),
        "/api/v1/equipment-types",
        json!({ "name": "Forklift" }),
        &keeper,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let type_id = created_id(
        post_json_auth(
            app.clone(),
            "/api/v1/equipment-types",
            json!({ "name": "Forklift", "description": "Electric, 1.5 t" }),
            &admin,
        )
        .await,
    )
    .await;

    let warehouse_id = created_id(
        post_json_auth(
            app.clone(),
            "/api/v1/warehouses",
            json!({ "name": "Central", "address": "1 Dock Road" }),
            &keeper,
        )
        .await,
    )
    .await;
    let list_uri = format!("/api/v1/warehouses/{warehouse_id}/equipment");

    let response = post_json_auth(
        app.clone(),
        &list_uri,
        json!({ "equipment_type_id": type_id, "name": "Forklift #1", "inventory_number": " INV-001 " }),
        &keeper,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let equipment_id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["inventory_number"], "INV-001");
    assert_eq!(json["data"]["status"], "operational");

    // Inventory numbers are unique.
    let response = post_json_auth(
        app.clone(),
        &list_uri,
        json!({ "equipment_type_id": type_id, "name": "Forklift #2", "inventory_number": "INV-001" }),
        &keeper,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        app.clone(),
        &list_uri,
        json!({ "equipment_type_id": type_id, "name": "Forklift #2", "inventory_number": "INV-002", "status": "broken" }),
        &keeper,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        &list_uri,
        json!({ "equipment_type_id": 9999, "name": "Forklift #2", "inventory_number": "INV-002" }),
        &keeper,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app.clone(), &list_uri, &driver).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/equipment/{equipment_id}");
    let response =
        put_json_auth(app.clone(), &uri, json!({ "status": "maintenance" }), &driver).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
        put_json_auth(app.clone(), &uri, json!({ "status": "maintenance" }), &keeper).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "maintenance");
    assert_eq!(json["data"]["name"], "Forklift #1");

    // A type still in use cannot be deleted.
    let type_uri = format!("/api/v1/equipment-types/{type_id}");
    let response = delete_auth(app.clone(), &type_uri, &admin).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = delete_auth(app.clone(), &uri, &keeper).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get_auth(app.clone(), &uri, &keeper).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app.clone(), &type_uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get_auth(app, &type_uri, &keeper).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn equipment_on_missing_warehouse_is_not_found(pool: PgPool) {
    let (_, keeper) = common::employee_with_token(&pool, "keeper", Role::Storekeeper).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/warehouses/9999/equipment", &keeper).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
