//! Handlers for equipment types and warehouse equipment.
//!
//! Admins maintain the type catalogue; storekeepers register and update the
//! equipment of their warehouses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use warehub_core::statuses::EquipmentStatus;
use warehub_core::types::DbId;
use warehub_core::validation::{validate_inventory_number, validate_name};
use warehub_db::models::equipment::{
    CreateEquipment, CreateEquipmentType, Equipment, EquipmentType, UpdateEquipment,
    UpdateEquipmentType,
};
use warehub_db::repositories::{EquipmentRepo, EquipmentTypeRepo, WarehouseRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthEmployee;
use crate::middleware::rbac::{RequireAdmin, RequireStorekeeper};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Equipment types
// ---------------------------------------------------------------------------

/// GET /api/v1/equipment-types
pub async fn list_types(
    State(state): State<AppState>,
    _employee: AuthEmployee,
) -> AppResult<Json<DataResponse<Vec<EquipmentType>>>> {
    let types = EquipmentTypeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: types }))
}

/// POST /api/v1/equipment-types
pub async fn create_type(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateEquipmentType>,
) -> AppResult<(StatusCode, Json<DataResponse<EquipmentType>>)> {
    validate_name("Equipment type name", &input.name)?;
    let equipment_type = EquipmentTypeRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: equipment_type })))
}

/// GET /api/v1/equipment-types/{id}
pub async fn get_type(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EquipmentType>>> {
    let equipment_type = EquipmentTypeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("EquipmentType", id))?;
    Ok(Json(DataResponse { data: equipment_type }))
}

/// PUT /api/v1/equipment-types/{id}
pub async fn update_type(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEquipmentType>,
) -> AppResult<Json<DataResponse<EquipmentType>>> {
    if let Some(name) = &input.name {
        validate_name("Equipment type name", name)?;
    }
    let equipment_type = EquipmentTypeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("EquipmentType", id))?;
    Ok(Json(DataResponse { data: equipment_type }))
}

/// DELETE /api/v1/equipment-types/{id}
///
/// Types still in use are protected by the foreign key (409).
pub async fn delete_type(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if EquipmentTypeRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("EquipmentType", id))
    }
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// GET /api/v1/warehouses/{id}/equipment
pub async fn list_equipment(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(warehouse_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Equipment>>>> {
    WarehouseRepo::find_by_id(&state.pool, warehouse_id)
        .await?
        .ok_or_else(|| AppError::not_found("Warehouse", warehouse_id))?;
    let equipment = EquipmentRepo::list_by_warehouse(&state.pool, warehouse_id).await?;
    Ok(Json(DataResponse { data: equipment }))
}

/// POST /api/v1/warehouses/{id}/equipment
pub async fn create_equipment(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(warehouse_id): Path<DbId>,
    Json(mut input): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<DataResponse<Equipment>>)> {
    validate_name("Equipment name", &input.name)?;
    input.inventory_number = input.inventory_number.trim().to_string();
    validate_inventory_number(&input.inventory_number)?;
    input.status = normalize_status(input.status)?;

    WarehouseRepo::find_by_id(&state.pool, warehouse_id)
        .await?
        .ok_or_else(|| AppError::not_found("Warehouse", warehouse_id))?;
    ensure_type(&state, input.equipment_type_id).await?;

    let equipment = EquipmentRepo::create(&state.pool, warehouse_id, &input).await?;
    tracing::info!(
        equipment_id = equipment.id,
        warehouse_id,
        inventory_number = %equipment.inventory_number,
        "Equipment registered"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: equipment })))
}

/// GET /api/v1/equipment/{id}
pub async fn get_equipment(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Equipment>>> {
    let equipment = EquipmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment", id))?;
    Ok(Json(DataResponse { data: equipment }))
}

/// PUT /api/v1/equipment/{id}
pub async fn update_equipment(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateEquipment>,
) -> AppResult<Json<DataResponse<Equipment>>> {
    if let Some(name) = &input.name {
        validate_name("Equipment name", name)?;
    }
    if let Some(number) = input.inventory_number.take() {
        let number = number.trim().to_string();
        validate_inventory_number(&number)?;
        input.inventory_number = Some(number);
    }
    input.status = normalize_status(input.status)?;
    if let Some(type_id) = input.equipment_type_id {
        ensure_type(&state, type_id).await?;
    }

    let equipment = EquipmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment", id))?;
    Ok(Json(DataResponse { data: equipment }))
}

/// DELETE /api/v1/equipment/{id}
pub async fn delete_equipment(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if EquipmentRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Equipment", id))
    }
}

fn normalize_status(status: Option<String>) -> AppResult<Option<String>> {
    Ok(status
        .map(|s| EquipmentStatus::from_str_db(s.trim()).map(|s| s.as_str().to_string()))
        .transpose()?)
}

async fn ensure_type(state: &AppState, id: DbId) -> AppResult<()> {
    EquipmentTypeRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("EquipmentType", id))
}
