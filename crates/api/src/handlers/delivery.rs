//! Handlers for vehicles, delivery tasks, route points and waybills.
//!
//! Logisticians plan tasks; drivers execute the ones assigned to them.
//! Starting a task ships every order on its route and visiting a point
//! delivers the order attached to it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use warehub_core::error::CoreError;
use warehub_core::roles::Role;
use warehub_core::routing::{check_vehicle_load, ttn_number, validate_reorder};
use warehub_core::statuses::{ClientOrderStatus, DeliveryTaskStatus};
use warehub_core::types::DbId;
use warehub_core::validation::{
    normalize_registration_number, validate_name, validate_non_negative, validate_text,
};
use warehub_core::workflow::{allowed_targets, check_transition, TASK_TRANSITIONS};
use warehub_db::models::logistics::{
    CreateDeliveryTask, CreateRoutePoint, CreateVehicle, DeliveryTask, RoutePoint, TaskFilter,
    Ttn, UpdateDeliveryTask, UpdateVehicle, Vehicle,
};
use warehub_db::repositories::{
    ClientOrderRepo, DeliveryTaskRepo, EmployeeRepo, RoleRepo, RoutePointRepo, TtnRepo,
    VehicleRepo,
};
use warehub_events::bus::{DELIVERY_TASK_ASSIGNED, ORDER_STATUS_CHANGED};
use warehub_events::{DomainEvent, EventActor};

use crate::error::{AppError, AppResult};
use crate::handlers::StatusRequest;
use crate::middleware::auth::AuthEmployee;
use crate::middleware::rbac::{RequireDriver, RequireLogistician};
use crate::query::ActiveOnlyParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /delivery-tasks`.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub planned_date: NaiveDate,
    pub vehicle_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub note: Option<String>,
}

/// Request body for `PUT /delivery-tasks/{id}/route-points/order`.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub point_ids: Vec<DbId>,
}

/// Status filter for `GET /driver/tasks`.
#[derive(Debug, Deserialize)]
pub struct DriverTaskQuery {
    pub status: Option<String>,
    pub planned_date: Option<NaiveDate>,
}

/// A task with its route, waybill and the moves the caller may make.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: DeliveryTask,
    pub route_points: Vec<RoutePoint>,
    pub load_kg: f64,
    pub ttn: Option<Ttn>,
    pub allowed_transitions: Vec<DeliveryTaskStatus>,
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

/// GET /api/v1/vehicles?active_only=
pub async fn list_vehicles(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Query(params): Query<ActiveOnlyParams>,
) -> AppResult<Json<DataResponse<Vec<Vehicle>>>> {
    let vehicles = VehicleRepo::list(&state.pool, params.active_only).await?;
    Ok(Json(DataResponse { data: vehicles }))
}

/// POST /api/v1/vehicles
pub async fn create_vehicle(
    State(state): State<AppState>,
    RequireLogistician(_employee): RequireLogistician,
    Json(mut input): Json<CreateVehicle>,
) -> AppResult<(StatusCode, Json<DataResponse<Vehicle>>)> {
    input.registration_number = normalize_registration_number(&input.registration_number)?;
    validate_name("Model", &input.model)?;
    validate_non_negative("Payload", input.payload_kg)?;
    validate_non_negative("Volume", input.volume_m3)?;

    let vehicle = VehicleRepo::create(&state.pool, &input).await?;
    tracing::info!(vehicle_id = vehicle.id, plate = %vehicle.registration_number, "Vehicle registered");
    Ok((StatusCode::CREATED, Json(DataResponse { data: vehicle })))
}

/// GET /api/v1/vehicles/{id}
pub async fn get_vehicle(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vehicle>>> {
    let vehicle = VehicleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle", id))?;
    Ok(Json(DataResponse { data: vehicle }))
}

/// PUT /api/v1/vehicles/{id}
pub async fn update_vehicle(
    State(state): State<AppState>,
    RequireLogistician(_employee): RequireLogistician,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateVehicle>,
) -> AppResult<Json<DataResponse<Vehicle>>> {
    input.registration_number = input
        .registration_number
        .as_deref()
        .map(normalize_registration_number)
        .transpose()?;
    if let Some(model) = &input.model {
        validate_name("Model", model)?;
    }
    if let Some(payload) = input.payload_kg {
        validate_non_negative("Payload", payload)?;
    }
    if let Some(volume) = input.volume_m3 {
        validate_non_negative("Volume", volume)?;
    }

    let vehicle = VehicleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle", id))?;
    Ok(Json(DataResponse { data: vehicle }))
}

/// DELETE /api/v1/vehicles/{id}
///
/// Vehicles referenced by tasks are protected by the foreign key (409).
pub async fn delete_vehicle(
    State(state): State<AppState>,
    RequireLogistician(_employee): RequireLogistician,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if VehicleRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Vehicle", id))
    }
}

// ---------------------------------------------------------------------------
// Delivery tasks
// ---------------------------------------------------------------------------

/// GET /api/v1/delivery-tasks?status=&driver_id=&planned_date=&limit=&offset=
pub async fn list_tasks(
    State(state): State<AppState>,
    RequireLogistician(_employee): RequireLogistician,
    Query(mut filter): Query<TaskFilter>,
) -> AppResult<Json<DataResponse<Vec<DeliveryTask>>>> {
    filter.status = parse_task_status(filter.status.as_deref())?;
    let tasks = DeliveryTaskRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// POST /api/v1/delivery-tasks
pub async fn create_task(
    State(state): State<AppState>,
    RequireLogistician(employee): RequireLogistician,
    Json(input): Json<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TaskDetail>>)> {
    if let Some(note) = &input.note {
        validate_text("Note", note)?;
    }
    if let Some(driver_id) = input.driver_id {
        ensure_driver(&state, driver_id).await?;
    }
    if let Some(vehicle_id) = input.vehicle_id {
        ensure_vehicle_free(&state, vehicle_id, input.planned_date, None).await?;
    }

    let task = DeliveryTaskRepo::create(
        &state.pool,
        &CreateDeliveryTask {
            planned_date: input.planned_date,
            vehicle_id: input.vehicle_id,
            driver_id: input.driver_id,
            note: input.note,
            created_by: employee.employee_id,
        },
    )
    .await?;

    tracing::info!(task_id = task.id, planned_date = %task.planned_date, "Delivery task created");
    if let Some(driver_id) = task.driver_id {
        publish_assignment(&state, &task, driver_id, employee.actor());
    }

    let detail = task_detail(&state, task, employee.role).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/delivery-tasks/{id}
///
/// Drivers may read only their own tasks.
pub async fn get_task(
    State(state): State<AppState>,
    employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskDetail>>> {
    let task = DeliveryTaskRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|t| visible_to(t, &employee))
        .ok_or_else(|| AppError::not_found("DeliveryTask", id))?;
    let detail = task_detail(&state, task, employee.role).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/delivery-tasks/{id}
///
/// Only planned tasks can be edited. A new vehicle must be free on the
/// (possibly new) date and able to carry the current route load.
pub async fn update_task(
    State(state): State<AppState>,
    RequireLogistician(employee): RequireLogistician,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDeliveryTask>,
) -> AppResult<Json<DataResponse<TaskDetail>>> {
    let current = DeliveryTaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("DeliveryTask", id))?;
    ensure_planned(&current)?;
    if let Some(note) = &input.note {
        validate_text("Note", note)?;
    }
    if let Some(driver_id) = input.driver_id {
        ensure_driver(&state, driver_id).await?;
    }

    let date = input.planned_date.unwrap_or(current.planned_date);
    if let Some(vehicle_id) = input.vehicle_id.or(current.vehicle_id) {
        let vehicle = ensure_vehicle_free(&state, vehicle_id, date, Some(id)).await?;
        let load = DeliveryTaskRepo::load_kg(&state.pool, id).await?;
        check_vehicle_load(vehicle.payload_kg, load)?;
    }

    let task = DeliveryTaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("DeliveryTask", id))?;

    if let Some(driver_id) = input.driver_id.filter(|d| Some(*d) != current.driver_id) {
        publish_assignment(&state, &task, driver_id, employee.actor());
    }

    let detail = task_detail(&state, task, employee.role).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/delivery-tasks/{id}/status
///
/// `in_progress` needs a vehicle, a driver and at least one route point, and
/// moves every attached order from `ready` to `shipping`. `completed` needs
/// every point visited.
pub async fn change_task_status(
    State(state): State<AppState>,
    employee: AuthEmployee,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<TaskDetail>>> {
    let target = DeliveryTaskStatus::from_str_db(input.status.trim())?;

    let mut tx = state.pool.begin().await?;
    let task = DeliveryTaskRepo::lock(&mut tx, id)
        .await?
        .filter(|t| visible_to(t, &employee))
        .ok_or_else(|| AppError::not_found("DeliveryTask", id))?;
    let from = DeliveryTaskStatus::from_str_db(&task.status)?;
    check_transition(TASK_TRANSITIONS, "delivery task", from, target, employee.role)?;

    let points = RoutePointRepo::list_by_task_in(&mut tx, id).await?;
    let mut shipped = Vec::new();
    match target {
        DeliveryTaskStatus::InProgress => {
            if task.vehicle_id.is_none() || task.driver_id.is_none() {
                return Err(AppError::Core(CoreError::Validation(
                    "Assign a vehicle and a driver before starting the task".into(),
                )));
            }
            if points.is_empty() {
                return Err(AppError::Core(CoreError::Validation(
                    "The route has no points".into(),
                )));
            }
            for order_id in points.iter().filter_map(|p| p.client_order_id) {
                let order = ClientOrderRepo::lock(&mut tx, order_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("ClientOrder", order_id))?;
                if order.status != ClientOrderStatus::Ready.as_str() {
                    return Err(AppError::Core(CoreError::Validation(format!(
                        "Order {order_id} is '{}', expected 'ready'",
                        order.status
                    ))));
                }
                let order = ClientOrderRepo::set_status_in(
                    &mut tx,
                    order_id,
                    ClientOrderStatus::Shipping.as_str(),
                )
                .await?
                .ok_or_else(|| AppError::not_found("ClientOrder", order_id))?;
                shipped.push(order);
            }
        }
        DeliveryTaskStatus::Completed => {
            let pending = points.iter().filter(|p| p.visited_at.is_none()).count();
            if pending > 0 {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "{pending} route point(s) not visited yet"
                ))));
            }
        }
        _ => {}
    }

    let task = DeliveryTaskRepo::set_status_in(&mut tx, id, target)
        .await?
        .ok_or_else(|| AppError::not_found("DeliveryTask", id))?;
    tx.commit().await?;

    tracing::info!(task_id = id, from = %from, to = %target, orders = shipped.len(), "Delivery task status changed");
    for order in &shipped {
        publish_order_status(&state, order.id, order.client_id, ClientOrderStatus::Shipping, employee.actor());
    }

    let detail = task_detail(&state, task, employee.role).await?;
    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// Route points
// ---------------------------------------------------------------------------

/// POST /api/v1/delivery-tasks/{id}/route-points
///
/// A point either carries a `ready` order (its address defaults to the
/// order's delivery address) or a bare address.
pub async fn add_route_point(
    State(state): State<AppState>,
    RequireLogistician(_employee): RequireLogistician,
    Path(task_id): Path<DbId>,
    Json(input): Json<CreateRoutePoint>,
) -> AppResult<(StatusCode, Json<DataResponse<RoutePoint>>)> {
    let task = DeliveryTaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or_else(|| AppError::not_found("DeliveryTask", task_id))?;
    ensure_planned(&task)?;

    let mut address = input.address.map(|a| a.trim().to_string());
    if let Some(order_id) = input.client_order_id {
        let order = ClientOrderRepo::find_by_id(&state.pool, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("ClientOrder", order_id))?;
        if order.status != ClientOrderStatus::Ready.as_str() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Only ready orders can be routed; order {order_id} is '{}'",
                order.status
            ))));
        }
        if RoutePointRepo::order_in_open_task(&state.pool, order_id).await? {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Order {order_id} is already on an open delivery task"
            ))));
        }
        if let Some(vehicle_id) = task.vehicle_id {
            let vehicle = VehicleRepo::find_by_id(&state.pool, vehicle_id)
                .await?
                .ok_or_else(|| AppError::not_found("Vehicle", vehicle_id))?;
            let load = DeliveryTaskRepo::load_kg(&state.pool, task_id).await?
                + ClientOrderRepo::weight_kg(&state.pool, order_id).await?;
            check_vehicle_load(vehicle.payload_kg, load)?;
        }
        address.get_or_insert(order.delivery_address);
    }

    let address = address.ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "A route point needs an address or an order".into(),
        ))
    })?;
    validate_name("Address", &address)?;

    let point = RoutePointRepo::append(
        &state.pool,
        task_id,
        &address,
        input.client_order_id,
        input.planned_arrival,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: point })))
}

/// PUT /api/v1/delivery-tasks/{id}/route-points/order
///
/// The body must list every point of the task exactly once.
pub async fn reorder_route_points(
    State(state): State<AppState>,
    RequireLogistician(_employee): RequireLogistician,
    Path(task_id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<Json<DataResponse<Vec<RoutePoint>>>> {
    let task = DeliveryTaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or_else(|| AppError::not_found("DeliveryTask", task_id))?;
    ensure_planned(&task)?;

    let existing: Vec<DbId> = RoutePointRepo::list_by_task(&state.pool, task_id)
        .await?
        .iter()
        .map(|p| p.id)
        .collect();
    validate_reorder(&existing, &input.point_ids)?;

    let points = RoutePointRepo::reorder(&state.pool, task_id, &input.point_ids).await?;
    Ok(Json(DataResponse { data: points }))
}

/// DELETE /api/v1/route-points/{id}
pub async fn delete_route_point(
    State(state): State<AppState>,
    RequireLogistician(_employee): RequireLogistician,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let point = RoutePointRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("RoutePoint", id))?;
    let task = DeliveryTaskRepo::find_by_id(&state.pool, point.task_id)
        .await?
        .ok_or_else(|| AppError::not_found("DeliveryTask", point.task_id))?;
    ensure_planned(&task)?;

    if RoutePointRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("RoutePoint", id))
    }
}

/// POST /api/v1/route-points/{id}/visit
///
/// Marks the point visited on a running task and delivers its order.
pub async fn visit_route_point(
    State(state): State<AppState>,
    employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RoutePoint>>> {
    if !matches!(employee.role, Role::Driver | Role::Logistician | Role::Admin) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only drivers and logisticians record visits".into(),
        )));
    }
    let point = RoutePointRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("RoutePoint", id))?;

    let mut tx = state.pool.begin().await?;
    let task = DeliveryTaskRepo::lock(&mut tx, point.task_id)
        .await?
        .filter(|t| visible_to(t, &employee))
        .ok_or_else(|| AppError::not_found("RoutePoint", id))?;
    if task.status != DeliveryTaskStatus::InProgress.as_str() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Points can be visited only on a task in progress; task {} is '{}'",
            task.id, task.status
        ))));
    }
    let point = RoutePointRepo::mark_visited_in(&mut tx, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Route point {id} is already visited"
            )))
        })?;

    let mut delivered = None;
    if let Some(order_id) = point.client_order_id {
        let order = ClientOrderRepo::lock(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("ClientOrder", order_id))?;
        if order.status == ClientOrderStatus::Shipping.as_str() {
            ClientOrderRepo::set_status_in(&mut tx, order_id, ClientOrderStatus::Delivered.as_str())
                .await?;
            delivered = Some(order);
        }
    }
    tx.commit().await?;

    if let Some(order) = delivered {
        publish_order_status(&state, order.id, order.client_id, ClientOrderStatus::Delivered, employee.actor());
    }
    Ok(Json(DataResponse { data: point }))
}

// ---------------------------------------------------------------------------
// Waybills
// ---------------------------------------------------------------------------

/// POST /api/v1/delivery-tasks/{id}/ttn
///
/// Issues the single waybill of a task. A second issue is a conflict.
pub async fn issue_ttn(
    State(state): State<AppState>,
    RequireLogistician(employee): RequireLogistician,
    Path(task_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<Ttn>>)> {
    let task = DeliveryTaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .ok_or_else(|| AppError::not_found("DeliveryTask", task_id))?;
    let status = DeliveryTaskStatus::from_str_db(&task.status)?;
    if !status.is_open() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Cannot issue a waybill for a '{status}' task"
        ))));
    }
    if task.vehicle_id.is_none() || task.driver_id.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "Assign a vehicle and a driver before issuing a waybill".into(),
        )));
    }

    let number = ttn_number(task.id, task.planned_date);
    let ttn = TtnRepo::create(&state.pool, task_id, &number, employee.employee_id).await?;
    tracing::info!(task_id, number = %ttn.number, "Waybill issued");
    Ok((StatusCode::CREATED, Json(DataResponse { data: ttn })))
}

/// GET /api/v1/delivery-tasks/{id}/ttn
pub async fn get_ttn(
    State(state): State<AppState>,
    employee: AuthEmployee,
    Path(task_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Ttn>>> {
    DeliveryTaskRepo::find_by_id(&state.pool, task_id)
        .await?
        .filter(|t| visible_to(t, &employee))
        .ok_or_else(|| AppError::not_found("DeliveryTask", task_id))?;
    let ttn = TtnRepo::find_by_task(&state.pool, task_id)
        .await?
        .ok_or_else(|| AppError::not_found("Ttn", task_id))?;
    Ok(Json(DataResponse { data: ttn }))
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// GET /api/v1/driver/tasks?status=&planned_date=
pub async fn driver_tasks(
    State(state): State<AppState>,
    RequireDriver(driver): RequireDriver,
    Query(params): Query<DriverTaskQuery>,
) -> AppResult<Json<DataResponse<Vec<DeliveryTask>>>> {
    let filter = TaskFilter {
        status: parse_task_status(params.status.as_deref())?,
        driver_id: Some(driver.employee_id),
        planned_date: params.planned_date,
        limit: None,
        offset: None,
    };
    let tasks = DeliveryTaskRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: tasks }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Drivers see only the tasks assigned to them; other roles see all.
fn visible_to(task: &DeliveryTask, employee: &AuthEmployee) -> bool {
    employee.role != Role::Driver || task.driver_id == Some(employee.employee_id)
}

fn ensure_planned(task: &DeliveryTask) -> AppResult<()> {
    if task.status != DeliveryTaskStatus::Planned.as_str() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Delivery task {} is '{}'; only planned tasks can be changed",
            task.id, task.status
        ))));
    }
    Ok(())
}

/// The employee must exist, be active and hold the `driver` role.
async fn ensure_driver(state: &AppState, driver_id: DbId) -> AppResult<()> {
    let employee = EmployeeRepo::find_by_id(&state.pool, driver_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee", driver_id))?;
    let role = RoleRepo::resolve_name(&state.pool, employee.role_id).await?;
    if !employee.is_active || role != Role::Driver.as_str() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Employee {driver_id} is not an active driver"
        ))));
    }
    Ok(())
}

/// The vehicle must exist, be active and not be used by another open task
/// on the same date.
async fn ensure_vehicle_free(
    state: &AppState,
    vehicle_id: DbId,
    date: NaiveDate,
    exclude_task_id: Option<DbId>,
) -> AppResult<Vehicle> {
    let vehicle = VehicleRepo::find_by_id(&state.pool, vehicle_id)
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle", vehicle_id))?;
    if !vehicle.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Vehicle {} is out of service",
            vehicle.registration_number
        ))));
    }
    if DeliveryTaskRepo::vehicle_booked(&state.pool, vehicle_id, date, exclude_task_id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Vehicle {} is already booked on {date}",
            vehicle.registration_number
        ))));
    }
    Ok(vehicle)
}

async fn task_detail(state: &AppState, task: DeliveryTask, role: Role) -> AppResult<TaskDetail> {
    let route_points = RoutePointRepo::list_by_task(&state.pool, task.id).await?;
    let load_kg = DeliveryTaskRepo::load_kg(&state.pool, task.id).await?;
    let ttn = TtnRepo::find_by_task(&state.pool, task.id).await?;
    let from = DeliveryTaskStatus::from_str_db(&task.status)?;
    Ok(TaskDetail {
        allowed_transitions: allowed_targets(TASK_TRANSITIONS, from, role),
        task,
        route_points,
        load_kg,
        ttn,
    })
}

fn publish_assignment(state: &AppState, task: &DeliveryTask, driver_id: DbId, actor: EventActor) {
    state.publish(
        DomainEvent::new(DELIVERY_TASK_ASSIGNED)
            .with_entity("delivery_task", task.id)
            .with_actor(actor)
            .with_payload(json!({
                "driver_id": driver_id,
                "planned_date": task.planned_date,
            })),
    );
}

fn publish_order_status(
    state: &AppState,
    order_id: DbId,
    client_id: DbId,
    status: ClientOrderStatus,
    actor: EventActor,
) {
    state.publish(
        DomainEvent::new(ORDER_STATUS_CHANGED)
            .with_entity("client_order", order_id)
            .with_actor(actor)
            .with_payload(json!({ "client_id": client_id, "status": status.as_str() })),
    );
}

fn parse_task_status(status: Option<&str>) -> AppResult<Option<String>> {
    Ok(status
        .map(|s| DeliveryTaskStatus::from_str_db(s.trim()).map(|s| s.as_str().to_string()))
        .transpose()?)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn task(driver_id: Option<DbId>, status: &str) -> DeliveryTask {
        DeliveryTask {
            id: 7,
            status: status.to_string(),
            planned_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            vehicle_id: None,
            driver_id,
            note: None,
            created_by: 1,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn employee(id: DbId, role: Role) -> AuthEmployee {
        AuthEmployee {
            employee_id: id,
            role,
        }
    }

    #[test]
    fn drivers_see_only_their_own_tasks() {
        let t = task(Some(5), "planned");
        assert!(visible_to(&t, &employee(5, Role::Driver)));
        assert!(!visible_to(&t, &employee(6, Role::Driver)));
        assert!(!visible_to(&task(None, "planned"), &employee(5, Role::Driver)));
    }

    #[test]
    fn other_roles_see_every_task() {
        let t = task(Some(5), "planned");
        assert!(visible_to(&t, &employee(1, Role::Logistician)));
        assert!(visible_to(&t, &employee(2, Role::Admin)));
    }

    #[test]
    fn only_planned_tasks_are_editable() {
        assert!(ensure_planned(&task(None, "planned")).is_ok());
        assert!(ensure_planned(&task(None, "in_progress")).is_err());
        assert!(ensure_planned(&task(None, "cancelled")).is_err());
    }
}
