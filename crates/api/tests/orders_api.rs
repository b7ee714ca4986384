//! Client order placement and the order status workflow.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;
use warehub_core::roles::Role;

#[sqlx::test(migrations = "../db/migrations")]
async fn order_snapshots_prices_and_follows_the_workflow(pool: PgPool) {
    let (_, manager) = common::employee_with_token(&pool, "manager", Role::Manager).await;
    let (_, keeper) = common::employee_with_token(&pool, "keeper", Role::Storekeeper).await;
    let (app, mailer) = common::build_test_app_with_mailer(pool);

    let client = common::client_with_profile(&app, &mailer, "buyer@example.com").await;
    let product_id = common::create_product(&app, &manager, "TEA-100", 0.01, 1250).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/visitor/orders",
        json!({
            "delivery_address": "5 Market St",
            "lines": [{ "product_id": product_id, "quantity": 2 }],
        }),
        &client,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = body_json(response).await;
    let order_id = order["data"]["id"].as_i64().unwrap();
    assert_eq!(order["data"]["status"], "new");
    assert_eq!(order["data"]["total_cents"], 2500);
    assert_eq!(order["data"]["lines"][0]["unit_price_cents"], 1250);

    // A later price change leaves the order untouched.
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/products/{product_id}"),
        json!({ "price_cents": 9999 }),
        &manager,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app.clone(), &format!("/api/v1/visitor/orders/{order_id}"), &client).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_cents"], 2500);

    let status_uri = format!("/api/v1/orders/{order_id}/status");

    // Storekeepers do not confirm orders.
    let response =
        post_json_auth(app.clone(), &status_uri, json!({ "status": "confirmed" }), &keeper).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Skipping a step is not a valid move.
    let response =
        post_json_auth(app.clone(), &status_uri, json!({ "status": "ready" }), &manager).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response =
        post_json_auth(app.clone(), &status_uri, json!({ "status": "confirmed" }), &manager).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "confirmed");

    // Once confirmed, the client can no longer cancel.
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/visitor/orders/{order_id}/cancel"),
        &client,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
        post_json_auth(app, &status_uri, json!({ "status": "assembling" }), &keeper).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn client_can_cancel_a_new_order(pool: PgPool) {
    let (_, manager) = common::employee_with_token(&pool, "manager", Role::Manager).await;
    let (app, mailer) = common::build_test_app_with_mailer(pool);

    let client = common::client_with_profile(&app, &mailer, "buyer@example.com").await;
    let product_id = common::create_product(&app, &manager, "SOAP-3", 0.002, 300).await;
    let order_id = common::created_id(
        post_json_auth(
            app.clone(),
            "/api/v1/visitor/orders",
            json!({
                "delivery_address": "5 Market St",
                "lines": [{ "product_id": product_id, "quantity": 1 }],
            }),
            &client,
        )
        .await,
    )
    .await;

    let response = post_auth(
        app,
        &format!("/api/v1/visitor/orders/{order_id}/cancel"),
        &client,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "cancelled");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn clients_only_see_their_own_orders(pool: PgPool) {
    let (_, manager) = common::employee_with_token(&pool, "manager", Role::Manager).await;
    let (app, mailer) = common::build_test_app_with_mailer(pool);

    let owner = common::client_with_profile(&app, &mailer, "owner@example.com").await;
    let (_, stranger) =
        common::register_visitor(&app, &mailer, "stranger@example.com", "client").await;
    let product_id = common::create_product(&app, &manager, "NAILS", 0.001, 90).await;

    let order_id = common::created_id(
        post_json_auth(
            app.clone(),
            "/api/v1/visitor/orders",
            json!({
                "delivery_address": "5 Market St",
                "lines": [{ "product_id": product_id, "quantity": 10 }],
            }),
            &owner,
        )
        .await,
    )
    .await;

    // No profile yet: ordering is refused.
    let response = post_json_auth(
        app.clone(),
        "/api/v1/visitor/orders",
        json!({
            "delivery_address": "Elsewhere",
            "lines": [{ "product_id": product_id, "quantity": 1 }],
        }),
        &stranger,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        app.clone(),
        "/api/v1/visitor/profile",
        json!({ "name": "Rival Trading", "inn": "500100732259" }),
        &stranger,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app, &format!("/api/v1/visitor/orders/{order_id}"), &stranger).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn order_lines_are_validated(pool: PgPool) {
    let (_, manager) = common::employee_with_token(&pool, "manager", Role::Manager).await;
    let (app, mailer) = common::build_test_app_with_mailer(pool);

    let client = common::client_with_profile(&app, &mailer, "buyer@example.com").await;
    let product_id = common::create_product(&app, &manager, "BOLT-8", 0.001, 15).await;

    for lines in [
        json!([]),
        json!([{ "product_id": product_id, "quantity": 0 }]),
        json!([
            { "product_id": product_id, "quantity": 1 },
            { "product_id": product_id, "quantity": 2 }
        ]),
    ] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/visitor/orders",
            json!({ "delivery_address": "5 Market St", "lines": lines }),
            &client,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "lines {lines}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn order_total_overflow_is_refused(pool: PgPool) {
    let (_, manager) = common::employee_with_token(&pool, "manager", Role::Manager).await;
    let (app, mailer) = common::build_test_app_with_mailer(pool);

    let client = common::client_with_profile(&app, &mailer, "buyer@example.com").await;
    let product_id =
        common::create_product(&app, &manager, "GOLD-1", 0.001, i64::MAX / 2).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/visitor/orders",
        json!({
            "delivery_address": "5 Market St",
            "lines": [{ "product_id": product_id, "quantity": 3 }],
        }),
        &client,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(app, "/api/v1/visitor/orders", &client).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}
