//! Write-off acts: filing, director decisions and the stock decrement.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, post_json_auth};
use serde_json::json;
use sqlx::PgPool;
use warehub_core::roles::Role;

struct Fixture {
    app: axum::Router,
    keeper: String,
    director: String,
    zone_id: i64,
    product_id: i64,
}

/// A zone holding five units of one product.
async fn stocked_zone(pool: PgPool) -> Fixture {
    let (_, keeper) = common::employee_with_token(&pool, "keeper", Role::Storekeeper).await;
    let (_, manager) = common::employee_with_token(&pool, "manager", Role::Manager).await;
    let (_, director) = common::employee_with_token(&pool, "director", Role::Director).await;
    let app = common::build_test_app(pool);

    let (_, zone_id) = common::create_zone(&app, &keeper, 10.0).await;
    let product_id = common::create_product(&app, &manager, "VASE-2", 0.2, 4500).await;
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/storage-zones/{zone_id}/products"),
        json!({ "product_id": product_id, "quantity": 5 }),
        &keeper,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    Fixture {
        app,
        keeper,
        director,
        zone_id,
        product_id,
    }
}

async fn file_act(f: &Fixture, quantity: i32) -> i64 {
    common::created_id(
        post_json_auth(
            f.app.clone(),
            "/api/v1/write-off-acts",
            json!({
                "zone_id": f.zone_id,
                "product_id": f.product_id,
                "quantity": quantity,
                "reason": "Broken in transit",
            }),
            &f.keeper,
        )
        .await,
    )
    .await
}

async fn zone_quantity(f: &Fixture) -> Option<i64> {
    let response = get_auth(
        f.app.clone(),
        &format!("/api/v1/storage-zones/{}/products", f.zone_id),
        &f.keeper,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["product_id"] == f.product_id)
        .and_then(|l| l["quantity"].as_i64())
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approval_decrements_stock_once(pool: PgPool) {
    let f = stocked_zone(pool).await;

    let first = file_act(&f, 3).await;
    let second = file_act(&f, 3).await;

    let response = post_json_auth(
        f.app.clone(),
        &format!("/api/v1/write-off-acts/{first}/approve"),
        json!({ "note": "Confirmed by photo" }),
        &f.director,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "approved");
    assert_eq!(json["data"]["decision_note"], "Confirmed by photo");
    assert_eq!(zone_quantity(&f).await, Some(2));

    // Only two units are left for the second act.
    let response = post_auth(
        f.app.clone(),
        &format!("/api/v1/write-off-acts/{second}/approve"),
        &f.director,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(zone_quantity(&f).await, Some(2));

    let response = post_auth(
        f.app.clone(),
        &format!("/api/v1/write-off-acts/{second}/reject"),
        &f.director,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "rejected");

    // A decided act cannot be decided again.
    let response = post_auth(
        f.app.clone(),
        &format!("/api/v1/write-off-acts/{first}/approve"),
        &f.director,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn writing_off_everything_removes_the_stock_line(pool: PgPool) {
    let f = stocked_zone(pool).await;

    let act = file_act(&f, 5).await;
    let response = post_auth(
        f.app.clone(),
        &format!("/api/v1/write-off-acts/{act}/approve"),
        &f.director,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(zone_quantity(&f).await, None);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn act_cannot_exceed_held_quantity(pool: PgPool) {
    let f = stocked_zone(pool).await;

    let response = post_json_auth(
        f.app.clone(),
        "/api/v1/write-off-acts",
        json!({
            "zone_id": f.zone_id,
            "product_id": f.product_id,
            "quantity": 6,
            "reason": "Water damage",
        }),
        &f.keeper,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
