#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use warehub_api::auth::jwt::{generate_access_token, JwtConfig};
use warehub_api::auth::password::hash_password;
use warehub_api::config::ServerConfig;
use warehub_api::router::build_app_router;
use warehub_api::state::AppState;
use warehub_core::roles::{PrincipalKind, Role};
use warehub_core::types::DbId;
use warehub_db::models::employee::{CreateEmployee, Employee};
use warehub_db::repositories::{EmployeeRepo, RoleRepo};
use warehub_events::{EmailError, EventBus, Mailer};

pub const TEST_PASSWORD: &str = "Correct-Horse-42";

pub fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-not-for-production".to_string(),
        access_token_expiry_mins: 15,
        refresh_token_expiry_days: 7,
    }
}

/// Build a test `ServerConfig` with safe defaults and a throwaway media dir.
pub fn test_config() -> ServerConfig {
    let media_dir = tempfile::tempdir()
        .expect("tempdir should be created")
        .into_path();
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: test_jwt(),
        media_dir,
        max_image_bytes: 1024 * 1024,
        otp_expiry_mins: 10,
        otp_max_attempts: 3,
        cleanup_interval_secs: 0,
    }
}

/// Mailer that keeps every message so tests can read verification codes.
#[derive(Default)]
pub struct CapturingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl CapturingMailer {
    /// The six-digit code from the last message sent to `to`.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        sent.iter().rev().find(|(addr, _)| addr == to).and_then(|(_, body)| {
            body.split(|c: char| !c.is_ascii_digit())
                .find(|w| w.len() == 6)
                .map(str::to_string)
        })
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, to: &str, _subject: &str, body: &str) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

/// Build the full application router on `pool`, returning the mailer too.
pub fn build_test_app_with_mailer(pool: PgPool) -> (Router, Arc<CapturingMailer>) {
    let config = test_config();
    let mailer = Arc::new(CapturingMailer::default());
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
        mailer: mailer.clone(),
    };
    (build_app_router(state, &config), mailer)
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_mailer(pool).0
}

/// Mint an access token directly, bypassing login.
pub fn token_for(kind: PrincipalKind, id: DbId, role: Role) -> String {
    generate_access_token(kind, id, role.as_str(), &test_jwt())
        .expect("token generation should succeed")
}

pub fn employee_token(id: DbId, role: Role) -> String {
    token_for(PrincipalKind::Employee, id, role)
}

/// Insert an employee with [`TEST_PASSWORD`] and the given role.
pub async fn create_employee(pool: &PgPool, login: &str, role: Role) -> Employee {
    let role_row = RoleRepo::find_by_name(pool, role.as_str())
        .await
        .expect("role lookup should succeed")
        .expect("role should be seeded");
    let input = CreateEmployee {
        login: login.to_string(),
        email: format!("{login}@test.local"),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        full_name: format!("Test {login}"),
        phone: None,
        role_id: role_row.id,
    };
    EmployeeRepo::create(pool, &input)
        .await
        .expect("employee creation should succeed")
}

/// Insert an employee and return a token for them.
pub async fn employee_with_token(pool: &PgPool, login: &str, role: Role) -> (Employee, String) {
    let employee = create_employee(pool, login, role).await;
    let token = employee_token(employee.id, role);
    (employee, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// POST a single-file multipart body.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    field: &str,
    bytes: &[u8],
    token: &str,
) -> Response<Body> {
    let boundary = "warehub-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload.bin\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Register and verify a visitor through the API; returns its id and token.
pub async fn register_visitor(
    app: &Router,
    mailer: &CapturingMailer,
    email: &str,
    role: &str,
) -> (DbId, String) {
    let response = post_json(
        app.clone(),
        "/api/v1/visitor/auth/register",
        serde_json::json!({
            "email": email,
            "password": TEST_PASSWORD,
            "full_name": "Test Visitor",
            "role": role,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::ACCEPTED);

    let code = mailer.last_code_for(email).expect("a code should be mailed");
    let response = post_json(
        app.clone(),
        "/api/v1/visitor/auth/verify",
        serde_json::json!({ "email": email, "code": code }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let json = body_json(response).await;
    let id = json["profile"]["id"].as_i64().expect("visitor id");
    let token = json["access_token"].as_str().expect("access token").to_string();
    (id, token)
}

/// The `data.id` of a created resource, asserting 201.
pub async fn created_id(response: Response<Body>) -> DbId {
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_i64().expect("created resource id")
}

/// Create a product through the API with a manager token.
pub async fn create_product(
    app: &Router,
    manager_token: &str,
    article: &str,
    volume_m3: f64,
    price_cents: i64,
) -> DbId {
    let body = serde_json::json!({
        "article": article,
        "name": format!("Product {article}"),
        "weight_kg": 2.0,
        "volume_m3": volume_m3,
        "price_cents": price_cents,
    });
    created_id(post_json_auth(app.clone(), "/api/v1/products", body, manager_token).await).await
}

/// Create warehouse -> shelf -> zone with the given capacity; returns
/// `(warehouse_id, zone_id)`.
pub async fn create_zone(app: &Router, storekeeper_token: &str, capacity_m3: f64) -> (DbId, DbId) {
    let warehouse_id = created_id(
        post_json_auth(
            app.clone(),
            "/api/v1/warehouses",
            serde_json::json!({ "name": "Central", "address": "1 Dock Road" }),
            storekeeper_token,
        )
        .await,
    )
    .await;
    let shelf_id = created_id(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/warehouses/{warehouse_id}/shelves"),
            serde_json::json!({ "code": "A" }),
            storekeeper_token,
        )
        .await,
    )
    .await;
    let zone_id = created_id(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/shelves/{shelf_id}/zones"),
            serde_json::json!({ "code": "A-1", "capacity_m3": capacity_m3 }),
            storekeeper_token,
        )
        .await,
    )
    .await;
    (warehouse_id, zone_id)
}

/// A registered client visitor with a linked client profile; returns its
/// token.
pub async fn client_with_profile(app: &Router, mailer: &CapturingMailer, email: &str) -> String {
    let (_, token) = register_visitor(app, mailer, email, "client").await;
    let response = put_json_auth(
        app.clone(),
        "/api/v1/visitor/profile",
        serde_json::json!({
            "name": "Horns and Hooves LLC",
            "inn": "7707083893",
            "address": "5 Market St",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    token
}
