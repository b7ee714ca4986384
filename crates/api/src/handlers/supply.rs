//! Handlers for requests for delivery sent to suppliers, their acceptance
//! acts and the resulting supplies.
//!
//! Managers draft and send requests; the supplier accepts, rejects and
//! ships them from `/visitor/delivery-requests`; storekeepers receive the
//! goods, record an acceptance act and complete the request.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use warehub_core::error::CoreError;
use warehub_core::roles::Role;
use warehub_core::statuses::RequestStatus;
use warehub_core::types::DbId;
use warehub_core::validation::{validate_name, validate_positive_quantity, validate_text};
use warehub_core::workflow::{allowed_targets, check_transition, REQUEST_TRANSITIONS};
use warehub_db::models::directory::Supplier;
use warehub_db::models::supply::{
    AcceptanceAct, AcceptanceActLine, AcceptedLine, CreateAcceptanceAct, CreateDelivery,
    CreateDeliveryRequest, Delivery, DeliveryRequest, RequestFilter, RequestLine,
    RequestedProductDetail, Supply,
};
use warehub_db::repositories::{
    AcceptanceActRepo, DeliveryRequestRepo, ProductRepo, SupplierRepo, SupplyRepo, WarehouseRepo,
};
use warehub_events::bus::{DELIVERY_REQUEST_SENT, DELIVERY_REQUEST_STATUS_CHANGED};
use warehub_events::{DomainEvent, EventActor};

use crate::error::{AppError, AppResult};
use crate::handlers::StatusRequest;
use crate::middleware::auth::AuthEmployee;
use crate::middleware::rbac::{RequireManager, RequireStorekeeper, RequireSupplier};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /delivery-requests`.
#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub supplier_id: DbId,
    pub warehouse_id: DbId,
    pub expected_date: Option<NaiveDate>,
    pub note: Option<String>,
    pub lines: Vec<RequestLine>,
}

/// Request body for `POST /delivery-requests/{id}/acceptance-act`.
#[derive(Debug, Deserialize)]
pub struct CreateActBody {
    pub note: Option<String>,
    pub lines: Vec<AcceptedLine>,
}

/// Request body for the supplier's status change. Shipment details are read
/// only when the target is `shipped`.
#[derive(Debug, Deserialize)]
pub struct SupplierStatusBody {
    pub status: String,
    #[serde(default)]
    pub delivery: Option<CreateDelivery>,
}

#[derive(Debug, Deserialize)]
pub struct SupplyQuery {
    pub supplier_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: DeliveryRequest,
    pub lines: Vec<RequestedProductDetail>,
    pub delivery: Option<Delivery>,
    pub allowed_transitions: Vec<RequestStatus>,
}

#[derive(Debug, Serialize)]
pub struct ActDetail {
    #[serde(flatten)]
    pub act: AcceptanceAct,
    pub lines: Vec<AcceptanceActLine>,
}

// ---------------------------------------------------------------------------
// Employee side
// ---------------------------------------------------------------------------

/// GET /api/v1/delivery-requests?status=&supplier_id=&limit=&offset=
pub async fn list_requests(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Query(mut filter): Query<RequestFilter>,
) -> AppResult<Json<DataResponse<Vec<DeliveryRequest>>>> {
    filter.status = parse_request_status(filter.status.as_deref())?;
    let requests = DeliveryRequestRepo::list(&state.pool, &filter, false).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/delivery-requests
///
/// Creates a draft in status `new`; the supplier sees it once it is sent.
pub async fn create_request(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    Json(input): Json<CreateRequestBody>,
) -> AppResult<(StatusCode, Json<DataResponse<RequestDetail>>)> {
    if let Some(note) = &input.note {
        validate_text("Note", note)?;
    }
    SupplierRepo::find_by_id(&state.pool, input.supplier_id)
        .await?
        .ok_or_else(|| AppError::not_found("Supplier", input.supplier_id))?;
    WarehouseRepo::find_by_id(&state.pool, input.warehouse_id)
        .await?
        .ok_or_else(|| AppError::not_found("Warehouse", input.warehouse_id))?;
    validate_request_lines(&state, &input.lines).await?;

    let request = DeliveryRequestRepo::create(
        &state.pool,
        &CreateDeliveryRequest {
            supplier_id: input.supplier_id,
            warehouse_id: input.warehouse_id,
            expected_date: input.expected_date,
            note: input.note,
            created_by: manager.employee_id,
            lines: input.lines,
        },
    )
    .await?;

    tracing::info!(
        request_id = request.id,
        supplier_id = request.supplier_id,
        "Delivery request drafted"
    );
    let detail = request_detail(&state, request, manager.role).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/delivery-requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RequestDetail>>> {
    let request = DeliveryRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("DeliveryRequest", id))?;
    let detail = request_detail(&state, request, employee.role).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/delivery-requests/{id}/status
///
/// `completed` requires an acceptance act and writes the supply record in
/// the same transaction.
pub async fn change_request_status(
    State(state): State<AppState>,
    employee: AuthEmployee,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<RequestDetail>>> {
    let target = RequestStatus::from_str_db(input.status.trim())?;
    let request = apply_status(&state, id, target, employee.actor(), None).await?;
    let detail = request_detail(&state, request, employee.role).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/delivery-requests/{id}/acceptance-act
///
/// Records what was actually received. Allowed once the goods are shipped
/// or received; a request has at most one act.
pub async fn create_acceptance_act(
    State(state): State<AppState>,
    RequireStorekeeper(storekeeper): RequireStorekeeper,
    Path(id): Path<DbId>,
    Json(input): Json<CreateActBody>,
) -> AppResult<(StatusCode, Json<DataResponse<ActDetail>>)> {
    let request = DeliveryRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("DeliveryRequest", id))?;
    let status = RequestStatus::from_str_db(&request.status)?;
    if !matches!(status, RequestStatus::Shipped | RequestStatus::Received) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "An acceptance act needs a shipped or received request; request {id} is '{status}'"
        ))));
    }
    if let Some(note) = &input.note {
        validate_text("Note", note)?;
    }

    let requested = DeliveryRequestRepo::lines(&state.pool, id).await?;
    check_accepted_lines(&requested, &input.lines)?;

    let act = AcceptanceActRepo::create(
        &state.pool,
        &CreateAcceptanceAct {
            request_id: id,
            accepted_by: storekeeper.employee_id,
            note: input.note,
            lines: input.lines,
        },
    )
    .await?;
    tracing::info!(request_id = id, act_id = act.id, "Acceptance act recorded");

    let lines = AcceptanceActRepo::lines(&state.pool, act.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ActDetail { act, lines },
        }),
    ))
}

/// GET /api/v1/delivery-requests/{id}/acceptance-act
pub async fn get_acceptance_act(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ActDetail>>> {
    let act = AcceptanceActRepo::find_by_request(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("AcceptanceAct", id))?;
    let lines = AcceptanceActRepo::lines(&state.pool, act.id).await?;
    Ok(Json(DataResponse {
        data: ActDetail { act, lines },
    }))
}

/// GET /api/v1/supplies?supplier_id=&limit=&offset=
pub async fn list_supplies(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Query(params): Query<SupplyQuery>,
) -> AppResult<Json<DataResponse<Vec<Supply>>>> {
    let supplies =
        SupplyRepo::list(&state.pool, params.supplier_id, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: supplies }))
}

// ---------------------------------------------------------------------------
// Supplier side
// ---------------------------------------------------------------------------

/// GET /api/v1/visitor/delivery-requests?status=&limit=&offset=
///
/// Drafts are never shown to the supplier.
pub async fn list_own_requests(
    State(state): State<AppState>,
    RequireSupplier(visitor): RequireSupplier,
    Query(mut filter): Query<RequestFilter>,
) -> AppResult<Json<DataResponse<Vec<DeliveryRequest>>>> {
    let supplier = linked_supplier(&state, visitor.visitor_id).await?;
    filter.status = parse_request_status(filter.status.as_deref())?;
    filter.supplier_id = Some(supplier.id);
    let requests = DeliveryRequestRepo::list(&state.pool, &filter, true).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/visitor/delivery-requests/{id}
pub async fn get_own_request(
    State(state): State<AppState>,
    RequireSupplier(visitor): RequireSupplier,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RequestDetail>>> {
    let request = own_request(&state, visitor.visitor_id, id).await?;
    let detail = request_detail(&state, request, Role::Supplier).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/visitor/delivery-requests/{id}/status
pub async fn change_own_request_status(
    State(state): State<AppState>,
    RequireSupplier(visitor): RequireSupplier,
    Path(id): Path<DbId>,
    Json(input): Json<SupplierStatusBody>,
) -> AppResult<Json<DataResponse<RequestDetail>>> {
    own_request(&state, visitor.visitor_id, id).await?;
    let target = RequestStatus::from_str_db(input.status.trim())?;
    let request = apply_status(&state, id, target, visitor.actor(), input.delivery).await?;
    let detail = request_detail(&state, request, Role::Supplier).await?;
    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lock the request, check the move and apply its side effects.
async fn apply_status(
    state: &AppState,
    id: DbId,
    target: RequestStatus,
    actor: EventActor,
    delivery: Option<CreateDelivery>,
) -> AppResult<DeliveryRequest> {
    let mut tx = state.pool.begin().await?;
    let current = DeliveryRequestRepo::lock(&mut tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("DeliveryRequest", id))?;
    let from = RequestStatus::from_str_db(&current.status)?;
    check_transition(REQUEST_TRANSITIONS, "delivery request", from, target, actor.role)?;

    match target {
        RequestStatus::Shipped => {
            let delivery = shipping_details(delivery)?;
            DeliveryRequestRepo::record_delivery_in(&mut tx, id, &delivery).await?;
        }
        RequestStatus::Completed => {
            if !AcceptanceActRepo::exists_in(&mut tx, id).await? {
                return Err(AppError::Core(CoreError::Validation(
                    "Record an acceptance act before completing the request".into(),
                )));
            }
            let supply = SupplyRepo::create_in(&mut tx, &current).await?;
            tracing::info!(request_id = id, supply_id = supply.id, "Supply recorded");
        }
        _ => {}
    }

    let request = DeliveryRequestRepo::set_status_in(&mut tx, id, target)
        .await?
        .ok_or_else(|| AppError::not_found("DeliveryRequest", id))?;
    tx.commit().await?;

    tracing::info!(request_id = id, from = %from, to = %target, role = %actor.role, "Delivery request status changed");

    let event = if target == RequestStatus::Sent {
        DomainEvent::new(DELIVERY_REQUEST_SENT)
            .with_payload(json!({ "supplier_id": request.supplier_id }))
    } else {
        DomainEvent::new(DELIVERY_REQUEST_STATUS_CHANGED).with_payload(json!({
            "supplier_id": request.supplier_id,
            "status": target.as_str(),
        }))
    };
    state.publish(event.with_entity("delivery_request", id).with_actor(actor));
    Ok(request)
}

/// Lines must be non-empty, name each product once and reference products
/// that exist.
async fn validate_request_lines(state: &AppState, lines: &[RequestLine]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A request needs at least one line".into(),
        )));
    }
    let mut seen = HashSet::new();
    for line in lines {
        validate_positive_quantity(line.quantity)?;
        if !seen.insert(line.product_id) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Product {} appears more than once",
                line.product_id
            ))));
        }
    }
    let ids: Vec<DbId> = seen.into_iter().collect();
    let found = ProductRepo::find_many(&state.pool, &ids).await?;
    if found.len() != ids.len() {
        let known: HashSet<DbId> = found.iter().map(|p| p.id).collect();
        let missing = ids.iter().find(|id| !known.contains(id)).copied().unwrap_or_default();
        return Err(AppError::not_found("Product", missing));
    }
    Ok(())
}

/// A shipment must name its carrier. Blank optional fields are dropped.
fn shipping_details(delivery: Option<CreateDelivery>) -> Result<CreateDelivery, CoreError> {
    let mut delivery = delivery.unwrap_or_default();
    let carrier = delivery
        .carrier
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| CoreError::Validation("Shipping requires the carrier".into()))?
        .to_string();
    validate_name("Carrier", &carrier)?;
    delivery.carrier = Some(carrier);

    let non_blank = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    delivery.vehicle_info = non_blank(delivery.vehicle_info);
    delivery.tracking_number = non_blank(delivery.tracking_number);
    Ok(delivery)
}

/// Every accepted line must reference a line of this request, at most once,
/// with a quantity between zero and the requested quantity.
fn check_accepted_lines(
    requested: &[RequestedProductDetail],
    accepted: &[AcceptedLine],
) -> Result<(), CoreError> {
    if accepted.is_empty() {
        return Err(CoreError::Validation(
            "An acceptance act needs at least one line".into(),
        ));
    }
    let mut seen = HashSet::new();
    for line in accepted {
        let Some(req) = requested.iter().find(|r| r.id == line.requested_product_id) else {
            return Err(CoreError::Validation(format!(
                "Line {} does not belong to this request",
                line.requested_product_id
            )));
        };
        if !seen.insert(line.requested_product_id) {
            return Err(CoreError::Validation(format!(
                "Line {} appears more than once",
                line.requested_product_id
            )));
        }
        if line.accepted_quantity < 0 || line.accepted_quantity > req.quantity {
            return Err(CoreError::Validation(format!(
                "Accepted quantity for line {} must be between 0 and {}",
                req.id, req.quantity
            )));
        }
    }
    Ok(())
}

async fn request_detail(
    state: &AppState,
    request: DeliveryRequest,
    role: Role,
) -> AppResult<RequestDetail> {
    let lines = DeliveryRequestRepo::lines(&state.pool, request.id).await?;
    let delivery = DeliveryRequestRepo::find_delivery(&state.pool, request.id).await?;
    let from = RequestStatus::from_str_db(&request.status)?;
    Ok(RequestDetail {
        allowed_transitions: allowed_targets(REQUEST_TRANSITIONS, from, role),
        request,
        lines,
        delivery,
    })
}

async fn linked_supplier(state: &AppState, visitor_id: DbId) -> AppResult<Supplier> {
    SupplierRepo::find_by_visitor(&state.pool, visitor_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Fill in your profile before working with requests".into(),
            ))
        })
}

/// A request addressed to the visitor's supplier and already sent. Anything
/// else is reported as missing.
async fn own_request(state: &AppState, visitor_id: DbId, id: DbId) -> AppResult<DeliveryRequest> {
    let supplier = linked_supplier(state, visitor_id).await?;
    DeliveryRequestRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|r| r.supplier_id == supplier.id)
        .filter(|r| {
            RequestStatus::from_str_db(&r.status).is_ok_and(|s| s.visible_to_supplier())
        })
        .ok_or_else(|| AppError::not_found("DeliveryRequest", id))
}

fn parse_request_status(status: Option<&str>) -> AppResult<Option<String>> {
    Ok(status
        .map(|s| RequestStatus::from_str_db(s.trim()).map(|s| s.as_str().to_string()))
        .transpose()?)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn requested(id: DbId, quantity: i32) -> RequestedProductDetail {
        RequestedProductDetail {
            id,
            request_id: 1,
            product_id: id * 10,
            article: format!("ART-{id}"),
            product_name: format!("Product {id}"),
            quantity,
        }
    }

    fn accepted(requested_product_id: DbId, accepted_quantity: i32) -> AcceptedLine {
        AcceptedLine {
            requested_product_id,
            accepted_quantity,
        }
    }

    #[test]
    fn partial_acceptance_is_allowed() {
        let req = [requested(1, 10), requested(2, 5)];
        assert!(check_accepted_lines(&req, &[accepted(1, 7), accepted(2, 0)]).is_ok());
    }

    #[test]
    fn accepting_more_than_requested_is_refused() {
        let req = [requested(1, 10)];
        assert_matches!(
            check_accepted_lines(&req, &[accepted(1, 11)]),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn shipping_needs_a_carrier() {
        assert_matches!(shipping_details(None), Err(CoreError::Validation(_)));
        let blank = CreateDelivery {
            carrier: Some("   ".into()),
            ..Default::default()
        };
        assert_matches!(shipping_details(Some(blank)), Err(CoreError::Validation(_)));

        let delivery = shipping_details(Some(CreateDelivery {
            carrier: Some(" FastFreight ".into()),
            tracking_number: Some(" ".into()),
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(delivery.carrier.as_deref(), Some("FastFreight"));
        assert_eq!(delivery.tracking_number, None);
    }

    #[test]
    fn foreign_and_duplicate_lines_are_refused() {
        let req = [requested(1, 10)];
        assert!(check_accepted_lines(&req, &[accepted(9, 1)]).is_err());
        assert!(check_accepted_lines(&req, &[accepted(1, 1), accepted(1, 2)]).is_err());
        assert!(check_accepted_lines(&req, &[]).is_err());
    }
}
