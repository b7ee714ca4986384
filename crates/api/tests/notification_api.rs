//! In-app notifications for employees and visitors.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth};
use sqlx::PgPool;
use warehub_core::roles::{PrincipalKind, Role};
use warehub_core::types::DbId;
use warehub_db::models::notification::CreateNotification;
use warehub_db::repositories::NotificationRepo;

async fn notify(pool: &PgPool, kind: PrincipalKind, recipient_id: DbId, title: &str) -> DbId {
    NotificationRepo::create(
        pool,
        &CreateNotification {
            recipient_kind: kind.as_str().to_string(),
            recipient_id,
            title: title.to_string(),
            body: format!("{title} body"),
            entity_type: None,
            entity_id: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn unread(app: &axum::Router, uri: &str, token: &str) -> i64 {
    let response = get_auth(app.clone(), uri, token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["unread"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn employee_reads_only_own_notifications(pool: PgPool) {
    let (me, token) = common::employee_with_token(&pool, "director", Role::Director).await;
    let (other, _) = common::employee_with_token(&pool, "manager", Role::Manager).await;

    let first = notify(&pool, PrincipalKind::Employee, me.id, "Write-off filed").await;
    notify(&pool, PrincipalKind::Employee, me.id, "Write-off filed again").await;
    notify(&pool, PrincipalKind::Employee, me.id, "Third write-off").await;
    let foreign = notify(&pool, PrincipalKind::Employee, other.id, "New order").await;
    let app = common::build_test_app(pool);

    let count_uri = "/api/v1/notifications/unread-count";
    assert_eq!(unread(&app, count_uri, &token).await, 3);

    let response = get_auth(app.clone(), "/api/v1/notifications", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/notifications/{first}/read"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(unread(&app, count_uri, &token).await, 2);

    let response = get_auth(
        app.clone(),
        "/api/v1/notifications?unread_only=true",
        &token,
    )
    .await;
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|n| n["is_read"] == false));

    // Someone else's notification looks missing.
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/notifications/{foreign}/read"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_auth(app.clone(), "/api/v1/notifications/read-all", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["marked"], 2);
    assert_eq!(unread(&app, count_uri, &token).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn visitor_and_employee_inboxes_are_separate(pool: PgPool) {
    let (employee, employee_token) =
        common::employee_with_token(&pool, "manager", Role::Manager).await;
    let (app, mailer) = common::build_test_app_with_mailer(pool.clone());
    let (visitor_id, visitor_token) =
        common::register_visitor(&app, &mailer, "buyer@example.com", "client").await;

    let for_visitor =
        notify(&pool, PrincipalKind::Visitor, visitor_id, "Order confirmed").await;
    // Same numeric id, other principal kind.
    notify(&pool, PrincipalKind::Employee, visitor_id, "Not for the visitor").await;
    notify(&pool, PrincipalKind::Employee, employee.id, "New order").await;

    let count_uri = "/api/v1/visitor/notifications/unread-count";
    assert_eq!(unread(&app, count_uri, &visitor_token).await, 1);

    let response = get_auth(app.clone(), "/api/v1/visitor/notifications", &visitor_token).await;
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Order confirmed");

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/notifications/{for_visitor}/read"),
        &employee_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/visitor/notifications/{for_visitor}/read"),
        &visitor_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(unread(&app, count_uri, &visitor_token).await, 0);

    let response =
        post_auth(app, "/api/v1/visitor/notifications/read-all", &visitor_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["marked"], 0);
}
