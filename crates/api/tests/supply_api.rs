//! Requests for delivery from draft to supply, across the manager,
//! supplier and storekeeper.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;
use warehub_core::roles::Role;

#[sqlx::test(migrations = "../db/migrations")]
async fn request_runs_from_draft_to_supply(pool: PgPool) {
    let (_, manager) = common::employee_with_token(&pool, "manager", Role::Manager).await;
    let (_, keeper) = common::employee_with_token(&pool, "keeper", Role::Storekeeper).await;
    let (app, mailer) = common::build_test_app_with_mailer(pool);

    let (_, supplier) =
        common::register_visitor(&app, &mailer, "sales@vendor.example", "supplier").await;
    let response = put_json_auth(
        app.clone(),
        "/api/v1/visitor/profile",
        json!({ "name": "Vendor JSC", "inn": "7707083893", "contact_person": "Anna" }),
        &supplier,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["data"]["kind"], "supplier");
    let supplier_id = profile["data"]["id"].as_i64().unwrap();

    let (warehouse_id, _) = common::create_zone(&app, &keeper, 50.0).await;
    let product_id = common::create_product(&app, &manager, "FLOUR-25", 0.04, 1800).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/delivery-requests",
        json!({
            "supplier_id": supplier_id,
            "warehouse_id": warehouse_id,
            "lines": [{ "product_id": product_id, "quantity": 40 }],
        }),
        &manager,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let request = body_json(response).await;
    let request_id = request["data"]["id"].as_i64().unwrap();
    let line_id = request["data"]["lines"][0]["id"].as_i64().unwrap();
    assert_eq!(request["data"]["status"], "new");

    // Drafts are invisible to the supplier.
    let own_uri = format!("/api/v1/visitor/delivery-requests/{request_id}");
    let response = get_auth(app.clone(), &own_uri, &supplier).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let status_uri = format!("/api/v1/delivery-requests/{request_id}/status");
    let response =
        post_json_auth(app.clone(), &status_uri, json!({ "status": "sent" }), &manager).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app.clone(), &own_uri, &supplier).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "sent");

    // Only the supplier answers a sent request.
    let response =
        post_json_auth(app.clone(), &status_uri, json!({ "status": "accepted" }), &manager).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let supplier_status_uri = format!("{own_uri}/status");
    let response = post_json_auth(
        app.clone(),
        &supplier_status_uri,
        json!({ "status": "accepted" }),
        &supplier,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Shipping without carrier details is refused.
    let response = post_json_auth(
        app.clone(),
        &supplier_status_uri,
        json!({ "status": "shipped" }),
        &supplier,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        &supplier_status_uri,
        json!({
            "status": "shipped",
            "delivery": { "carrier": "FastFreight", "tracking_number": "FF-1029" },
        }),
        &supplier,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["delivery"]["carrier"], "FastFreight");

    let response =
        post_json_auth(app.clone(), &status_uri, json!({ "status": "received" }), &keeper).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Completion needs an acceptance act first.
    let response =
        post_json_auth(app.clone(), &status_uri, json!({ "status": "completed" }), &keeper).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let act_uri = format!("/api/v1/delivery-requests/{request_id}/acceptance-act");
    let response = post_json_auth(
        app.clone(),
        &act_uri,
        json!({ "lines": [{ "requested_product_id": line_id, "accepted_quantity": 41 }] }),
        &keeper,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        &act_uri,
        json!({
            "note": "Two sacks torn",
            "lines": [{ "requested_product_id": line_id, "accepted_quantity": 38 }],
        }),
        &keeper,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response =
        post_json_auth(app.clone(), &status_uri, json!({ "status": "completed" }), &keeper).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(
        app,
        &format!("/api/v1/supplies?supplier_id={supplier_id}"),
        &manager,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let supplies = json["data"].as_array().unwrap();
    assert_eq!(supplies.len(), 1);
    assert_eq!(supplies[0]["request_id"], request_id);
    assert_eq!(supplies[0]["total_quantity"], 38);
}
