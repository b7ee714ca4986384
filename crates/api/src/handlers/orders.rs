//! Handlers for client orders.
//!
//! Clients place, read and cancel their own orders under `/visitor/orders`.
//! Employees see every order under `/orders` and move it through the
//! workflow; which moves a role may make is decided by
//! [`ORDER_TRANSITIONS`]. Both sides share the order comment thread.

use std::collections::{HashMap, HashSet};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use warehub_core::error::CoreError;
use warehub_core::roles::{PrincipalKind, Role};
use warehub_core::statuses::ClientOrderStatus;
use warehub_core::types::DbId;
use warehub_core::validation::{
    order_total, validate_name, validate_positive_quantity, validate_text,
};
use warehub_core::workflow::{allowed_targets, check_transition, ORDER_TRANSITIONS};
use warehub_db::models::directory::Client;
use warehub_db::models::order::{
    ClientOrder, Comment, CreateClientOrder, CreateComment, NewOrderLine, OrderFilter,
    OrderedProductDetail,
};
use warehub_db::repositories::{
    ClientOrderRepo, ClientRepo, CommentRepo, EmployeeRepo, ProductRepo, VisitorRepo,
};
use warehub_events::bus::{ORDER_CREATED, ORDER_STATUS_CHANGED};
use warehub_events::{DomainEvent, EventActor};

use crate::error::{AppError, AppResult};
use crate::handlers::StatusRequest;
use crate::middleware::auth::AuthEmployee;
use crate::middleware::rbac::RequireClient;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: DbId,
    pub quantity: i32,
}

/// Request body for `POST /visitor/orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub delivery_address: String,
    pub note: Option<String>,
    pub lines: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub body: String,
}

/// Status filter for the visitor's own order list.
#[derive(Debug, Deserialize)]
pub struct VisitorOrderQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// An order with its lines and the statuses the caller may move it to.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: ClientOrder,
    pub lines: Vec<OrderedProductDetail>,
    pub allowed_transitions: Vec<ClientOrderStatus>,
}

// ---------------------------------------------------------------------------
// Client side
// ---------------------------------------------------------------------------

/// POST /api/v1/visitor/orders
///
/// Prices are copied from the catalog at this moment; later price changes do
/// not affect the order.
pub async fn create_order(
    State(state): State<AppState>,
    RequireClient(visitor): RequireClient,
    Json(input): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<OrderDetail>>)> {
    let client = linked_client(&state, visitor.visitor_id).await?;
    validate_name("Delivery address", &input.delivery_address)?;
    if let Some(note) = &input.note {
        validate_text("Note", note)?;
    }
    let lines = price_lines(&state, &input.lines).await?;
    let total_cents = order_total(lines.iter().map(|l| (l.quantity, l.unit_price_cents)))?;

    let order = ClientOrderRepo::create(
        &state.pool,
        &CreateClientOrder {
            client_id: client.id,
            delivery_address: input.delivery_address.trim().to_string(),
            note: input.note,
            total_cents,
            lines,
        },
    )
    .await?;

    tracing::info!(
        order_id = order.id,
        client_id = client.id,
        total_cents = order.total_cents,
        "Order placed"
    );
    state.publish(
        DomainEvent::new(ORDER_CREATED)
            .with_entity("client_order", order.id)
            .with_actor(visitor.actor())
            .with_payload(json!({ "client_id": client.id, "total_cents": order.total_cents })),
    );

    let detail = order_detail(&state, order, Role::Client).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/visitor/orders?status=&limit=&offset=
pub async fn list_own_orders(
    State(state): State<AppState>,
    RequireClient(visitor): RequireClient,
    Query(params): Query<VisitorOrderQuery>,
) -> AppResult<Json<DataResponse<Vec<ClientOrder>>>> {
    let client = linked_client(&state, visitor.visitor_id).await?;
    let filter = OrderFilter {
        status: parse_status(params.status.as_deref())?,
        client_id: Some(client.id),
        limit: params.limit,
        offset: params.offset,
    };
    let orders = ClientOrderRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/visitor/orders/{id}
pub async fn get_own_order(
    State(state): State<AppState>,
    RequireClient(visitor): RequireClient,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OrderDetail>>> {
    let order = own_order(&state, visitor.visitor_id, id).await?;
    let detail = order_detail(&state, order, Role::Client).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/visitor/orders/{id}/cancel
pub async fn cancel_own_order(
    State(state): State<AppState>,
    RequireClient(visitor): RequireClient,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OrderDetail>>> {
    own_order(&state, visitor.visitor_id, id).await?;
    let order = apply_status(
        &state,
        id,
        ClientOrderStatus::Cancelled,
        Role::Client,
        visitor.actor(),
    )
    .await?;
    let detail = order_detail(&state, order, Role::Client).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/visitor/orders/{id}/comments
pub async fn list_own_comments(
    State(state): State<AppState>,
    RequireClient(visitor): RequireClient,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Comment>>>> {
    own_order(&state, visitor.visitor_id, id).await?;
    let comments = CommentRepo::list_by_order(&state.pool, id).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// POST /api/v1/visitor/orders/{id}/comments
pub async fn add_own_comment(
    State(state): State<AppState>,
    RequireClient(visitor): RequireClient,
    Path(id): Path<DbId>,
    Json(input): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    own_order(&state, visitor.visitor_id, id).await?;
    let author = VisitorRepo::find_by_id(&state.pool, visitor.visitor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Visitor", visitor.visitor_id))?;
    let comment = post_comment(
        &state,
        id,
        PrincipalKind::Visitor,
        visitor.visitor_id,
        author.full_name,
        &input.body,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

// ---------------------------------------------------------------------------
// Employee side
// ---------------------------------------------------------------------------

/// GET /api/v1/orders?status=&client_id=&limit=&offset=
pub async fn list_orders(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Query(mut filter): Query<OrderFilter>,
) -> AppResult<Json<DataResponse<Vec<ClientOrder>>>> {
    filter.status = parse_status(filter.status.as_deref())?;
    let orders = ClientOrderRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OrderDetail>>> {
    let order = ClientOrderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("ClientOrder", id))?;
    let detail = order_detail(&state, order, employee.role).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/orders/{id}/status
pub async fn change_order_status(
    State(state): State<AppState>,
    employee: AuthEmployee,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<OrderDetail>>> {
    let target = ClientOrderStatus::from_str_db(input.status.trim())?;
    let order = apply_status(&state, id, target, employee.role, employee.actor()).await?;
    let detail = order_detail(&state, order, employee.role).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/orders/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Comment>>>> {
    ensure_order(&state, id).await?;
    let comments = CommentRepo::list_by_order(&state.pool, id).await?;
    Ok(Json(DataResponse { data: comments }))
}

/// POST /api/v1/orders/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    employee: AuthEmployee,
    Path(id): Path<DbId>,
    Json(input): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    ensure_order(&state, id).await?;
    let author = EmployeeRepo::find_by_id(&state.pool, employee.employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee", employee.employee_id))?;
    let comment = post_comment(
        &state,
        id,
        PrincipalKind::Employee,
        employee.employee_id,
        author.full_name,
        &input.body,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lock the order, check the move against the workflow table and apply it.
async fn apply_status(
    state: &AppState,
    id: DbId,
    target: ClientOrderStatus,
    role: Role,
    actor: EventActor,
) -> AppResult<ClientOrder> {
    let mut tx = state.pool.begin().await?;
    let current = ClientOrderRepo::lock(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("ClientOrder", id))?;
    let from = ClientOrderStatus::from_str_db(&current.status)?;
    check_transition(ORDER_TRANSITIONS, "order", from, target, role)?;
    let order = ClientOrderRepo::set_status_in(&mut tx, id, target.as_str())
        .await?
        .ok_or_else(|| AppError::not_found("ClientOrder", id))?;
    tx.commit().await?;

    tracing::info!(order_id = id, from = %from, to = %target, role = %role, "Order status changed");
    state.publish(
        DomainEvent::new(ORDER_STATUS_CHANGED)
            .with_entity("client_order", id)
            .with_actor(actor)
            .with_payload(json!({ "client_id": order.client_id, "status": target.as_str() })),
    );
    Ok(order)
}

/// Validate requested lines and price them from the catalog.
///
/// Every product must exist and be active; a product may appear only once.
async fn price_lines(state: &AppState, requested: &[OrderLineRequest]) -> AppResult<Vec<NewOrderLine>> {
    if requested.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "An order needs at least one line".into(),
        )));
    }
    let mut seen = HashSet::new();
    for line in requested {
        validate_positive_quantity(line.quantity)?;
        if !seen.insert(line.product_id) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Product {} appears more than once",
                line.product_id
            ))));
        }
    }

    let ids: Vec<DbId> = requested.iter().map(|l| l.product_id).collect();
    let products: HashMap<DbId, _> = ProductRepo::find_many(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    requested
        .iter()
        .map(|line| {
            let product = products
                .get(&line.product_id)
                .filter(|p| p.is_active)
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(format!(
                        "Product {} is not available",
                        line.product_id
                    )))
                })?;
            Ok(NewOrderLine {
                product_id: product.id,
                quantity: line.quantity,
                unit_price_cents: product.price_cents,
            })
        })
        .collect()
}

async fn post_comment(
    state: &AppState,
    order_id: DbId,
    kind: PrincipalKind,
    author_id: DbId,
    author_name: String,
    body: &str,
) -> AppResult<Comment> {
    let body = body.trim();
    validate_name("Comment", body)?;
    validate_text("Comment", body)?;
    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            order_id,
            author_kind: kind.as_str().to_string(),
            author_id,
            author_name,
            body: body.to_string(),
        },
    )
    .await?;
    Ok(comment)
}

async fn order_detail(state: &AppState, order: ClientOrder, role: Role) -> AppResult<OrderDetail> {
    let lines = ClientOrderRepo::lines(&state.pool, order.id).await?;
    let from = ClientOrderStatus::from_str_db(&order.status)?;
    Ok(OrderDetail {
        allowed_transitions: allowed_targets(ORDER_TRANSITIONS, from, role),
        order,
        lines,
    })
}

/// The client record the visitor acts for.
async fn linked_client(state: &AppState, visitor_id: DbId) -> AppResult<Client> {
    ClientRepo::find_by_visitor(&state.pool, visitor_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Fill in your profile before placing orders".into(),
            ))
        })
}

/// An order of the visitor's client. Other clients' orders are reported as
/// missing.
async fn own_order(state: &AppState, visitor_id: DbId, id: DbId) -> AppResult<ClientOrder> {
    let client = linked_client(state, visitor_id).await?;
    ClientOrderRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|o| o.client_id == client.id)
        .ok_or_else(|| AppError::not_found("ClientOrder", id))
}

async fn ensure_order(state: &AppState, id: DbId) -> AppResult<()> {
    ClientOrderRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("ClientOrder", id))
}

fn parse_status(status: Option<&str>) -> AppResult<Option<String>> {
    Ok(status
        .map(|s| ClientOrderStatus::from_str_db(s.trim()).map(|s| s.as_str().to_string()))
        .transpose()?)
}
