//! Product image uploads: content sniffing, size limit and serving.

mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, get, get_auth, post_multipart_auth};
use sqlx::PgPool;
use warehub_core::roles::Role;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

fn png(extra: usize) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend(std::iter::repeat(0u8).take(extra));
    bytes
}

#[sqlx::test(migrations = "../db/migrations")]
async fn image_upload_is_stored_and_served(pool: PgPool) {
    let (_, manager) = common::employee_with_token(&pool, "manager", Role::Manager).await;
    let app = common::build_test_app(pool);
    let product_id = common::create_product(&app, &manager, "LAMP-3", 0.01, 990).await;
    let uri = format!("/api/v1/products/{product_id}/image");

    let upload = png(64);
    let response = post_multipart_auth(app.clone(), &uri, "image", &upload, &manager).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let path = json["data"]["image_path"].as_str().unwrap().to_string();
    assert!(path.starts_with(&format!("products/{product_id}-")));
    assert!(path.ends_with(".png"));

    let response = get(app.clone(), &format!("/media/{path}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, upload);

    // A replacement removes the previous file.
    let response = post_multipart_auth(app.clone(), &uri, "image", &png(8), &manager).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["data"]["image_path"], path.as_str());

    let response = get(app.clone(), &format!("/media/{path}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, &format!("/api/v1/products/{product_id}"), &manager).await;
    let json = body_json(response).await;
    assert!(json["data"]["image_path"].as_str().unwrap().ends_with(".png"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn uploads_are_checked_by_content_and_size(pool: PgPool) {
    let (_, manager) = common::employee_with_token(&pool, "manager", Role::Manager).await;
    let (_, keeper) = common::employee_with_token(&pool, "keeper", Role::Storekeeper).await;
    let app = common::build_test_app(pool);
    let product_id = common::create_product(&app, &manager, "LAMP-3", 0.01, 990).await;
    let uri = format!("/api/v1/products/{product_id}/image");

    // Plain text with an image-looking field is refused.
    let response =
        post_multipart_auth(app.clone(), &uri, "image", b"definitely not an image", &manager)
            .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Recognised but unsupported formats are refused too.
    let response = post_multipart_auth(app.clone(), &uri, "image", b"GIF89a\x01\x00\x01\x00", &manager)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The test config allows 1 MiB.
    let response =
        post_multipart_auth(app.clone(), &uri, "image", &png(1024 * 1024), &manager).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_multipart_auth(app.clone(), &uri, "photo", &png(16), &manager).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_multipart_auth(app.clone(), &uri, "image", &png(16), &keeper).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
        post_multipart_auth(app.clone(), "/api/v1/products/9999/image", "image", &png(16), &manager)
            .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, &format!("/api/v1/products/{product_id}"), &manager).await;
    let json = body_json(response).await;
    assert!(json["data"]["image_path"].is_null());
}
