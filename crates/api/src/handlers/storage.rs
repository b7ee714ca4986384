//! Handlers for the storage hierarchy (warehouses, shelves, zones), stock
//! placement and occupancy reports.
//!
//! Every write that adds volume to a zone runs in one transaction: the zone
//! row is locked, its load recomputed and checked with
//! [`check_fits`], then the stock line is written.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use warehub_core::occupancy::{aggregate, check_fits, line_volume, Occupancy, ZoneLoad};
use warehub_core::types::DbId;
use warehub_core::validation::{
    validate_name, validate_non_negative, validate_positive_quantity,
};
use warehub_db::models::storage::{
    CreateShelf, CreateStorageZone, CreateWarehouse, PlaceProduct, Shelf, StorageZone,
    UpdateShelf, UpdateStorageZone, UpdateWarehouse, Warehouse, ZoneLoadRow, ZoneProduct,
    ZoneProductDetail,
};
use warehub_db::repositories::{
    ProductRepo, ShelfRepo, StorageZoneRepo, WarehouseRepo, ZoneProductRepo,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthEmployee;
use crate::middleware::rbac::RequireStorekeeper;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Warehouses
// ---------------------------------------------------------------------------

/// GET /api/v1/warehouses
pub async fn list_warehouses(
    State(state): State<AppState>,
    _employee: AuthEmployee,
) -> AppResult<Json<DataResponse<Vec<Warehouse>>>> {
    let warehouses = WarehouseRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: warehouses }))
}

/// POST /api/v1/warehouses
pub async fn create_warehouse(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Json(input): Json<CreateWarehouse>,
) -> AppResult<(StatusCode, Json<DataResponse<Warehouse>>)> {
    validate_name("Warehouse name", &input.name)?;
    validate_name("Address", &input.address)?;
    let warehouse = WarehouseRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: warehouse })))
}

/// GET /api/v1/warehouses/{id}
pub async fn get_warehouse(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Warehouse>>> {
    let warehouse = WarehouseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Warehouse", id))?;
    Ok(Json(DataResponse { data: warehouse }))
}

/// PUT /api/v1/warehouses/{id}
pub async fn update_warehouse(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWarehouse>,
) -> AppResult<Json<DataResponse<Warehouse>>> {
    if let Some(name) = &input.name {
        validate_name("Warehouse name", name)?;
    }
    let warehouse = WarehouseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Warehouse", id))?;
    Ok(Json(DataResponse { data: warehouse }))
}

/// DELETE /api/v1/warehouses/{id}
pub async fn delete_warehouse(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if WarehouseRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Warehouse", id))
    }
}

// ---------------------------------------------------------------------------
// Shelves
// ---------------------------------------------------------------------------

/// GET /api/v1/warehouses/{id}/shelves
pub async fn list_shelves(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(warehouse_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Shelf>>>> {
    ensure_warehouse(&state, warehouse_id).await?;
    let shelves = ShelfRepo::list_by_warehouse(&state.pool, warehouse_id).await?;
    Ok(Json(DataResponse { data: shelves }))
}

/// POST /api/v1/warehouses/{id}/shelves
pub async fn create_shelf(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(warehouse_id): Path<DbId>,
    Json(input): Json<CreateShelf>,
) -> AppResult<(StatusCode, Json<DataResponse<Shelf>>)> {
    validate_name("Shelf code", &input.code)?;
    ensure_warehouse(&state, warehouse_id).await?;
    let shelf = ShelfRepo::create(&state.pool, warehouse_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: shelf })))
}

/// GET /api/v1/shelves/{id}
pub async fn get_shelf(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Shelf>>> {
    let shelf = ShelfRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Shelf", id))?;
    Ok(Json(DataResponse { data: shelf }))
}

/// PUT /api/v1/shelves/{id}
pub async fn update_shelf(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateShelf>,
) -> AppResult<Json<DataResponse<Shelf>>> {
    if let Some(code) = &input.code {
        validate_name("Shelf code", code)?;
    }
    let shelf = ShelfRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Shelf", id))?;
    Ok(Json(DataResponse { data: shelf }))
}

/// DELETE /api/v1/shelves/{id}
pub async fn delete_shelf(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ShelfRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Shelf", id))
    }
}

// ---------------------------------------------------------------------------
// Storage zones
// ---------------------------------------------------------------------------

/// GET /api/v1/shelves/{id}/zones
pub async fn list_zones(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(shelf_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<StorageZone>>>> {
    ensure_shelf(&state, shelf_id).await?;
    let zones = StorageZoneRepo::list_by_shelf(&state.pool, shelf_id).await?;
    Ok(Json(DataResponse { data: zones }))
}

/// POST /api/v1/shelves/{id}/zones
pub async fn create_zone(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(shelf_id): Path<DbId>,
    Json(input): Json<CreateStorageZone>,
) -> AppResult<(StatusCode, Json<DataResponse<StorageZone>>)> {
    validate_name("Zone code", &input.code)?;
    validate_non_negative("Capacity", input.capacity_m3)?;
    ensure_shelf(&state, shelf_id).await?;
    let zone = StorageZoneRepo::create(&state.pool, shelf_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: zone })))
}

/// GET /api/v1/storage-zones/{id}
pub async fn get_zone(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StorageZone>>> {
    let zone = StorageZoneRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("StorageZone", id))?;
    Ok(Json(DataResponse { data: zone }))
}

/// PUT /api/v1/storage-zones/{id}
///
/// Capacity may not drop below the volume already stored.
pub async fn update_zone(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStorageZone>,
) -> AppResult<Json<DataResponse<StorageZone>>> {
    if let Some(code) = &input.code {
        validate_name("Zone code", code)?;
    }

    let mut tx = state.pool.begin().await?;
    if !StorageZoneRepo::lock(&mut tx, id).await? {
        return Err(AppError::not_found("StorageZone", id));
    }
    if let Some(capacity) = input.capacity_m3 {
        validate_non_negative("Capacity", capacity)?;
        let load = StorageZoneRepo::load_in(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("StorageZone", id))?;
        check_fits(&ZoneLoad::new(capacity, 0.0), load.used_m3)?;
    }
    let zone = StorageZoneRepo::update_in(&mut tx, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("StorageZone", id))?;
    tx.commit().await?;

    Ok(Json(DataResponse { data: zone }))
}

/// DELETE /api/v1/storage-zones/{id}
pub async fn delete_zone(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if StorageZoneRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("StorageZone", id))
    }
}

// ---------------------------------------------------------------------------
// Stock
// ---------------------------------------------------------------------------

/// GET /api/v1/storage-zones/{id}/products
pub async fn list_zone_products(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(zone_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ZoneProductDetail>>>> {
    ensure_zone(&state, zone_id).await?;
    let lines = ZoneProductRepo::list_by_zone(&state.pool, zone_id).await?;
    Ok(Json(DataResponse { data: lines }))
}

/// POST /api/v1/storage-zones/{id}/products
///
/// Adds units of a product to a zone, merging with an existing line.
pub async fn place_product(
    State(state): State<AppState>,
    RequireStorekeeper(employee): RequireStorekeeper,
    Path(zone_id): Path<DbId>,
    Json(input): Json<PlaceProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<ZoneProduct>>)> {
    validate_positive_quantity(input.quantity)?;
    let product = ProductRepo::find_by_id(&state.pool, input.product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", input.product_id))?;

    let mut tx = state.pool.begin().await?;
    if !StorageZoneRepo::lock(&mut tx, zone_id).await? {
        return Err(AppError::not_found("StorageZone", zone_id));
    }
    let load = StorageZoneRepo::load_in(&mut tx, zone_id)
        .await?
        .ok_or_else(|| AppError::not_found("StorageZone", zone_id))?;
    check_fits(
        &to_load(&load),
        line_volume(input.quantity, product.volume_m3),
    )?;
    let line = ZoneProductRepo::add_in(&mut tx, zone_id, product.id, input.quantity).await?;
    tx.commit().await?;

    tracing::info!(
        zone_id,
        product_id = product.id,
        quantity = input.quantity,
        employee_id = employee.employee_id,
        "Stock placed"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: line })))
}

/// Request body for `PUT /zone-products/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// PUT /api/v1/zone-products/{id}
///
/// Sets the quantity of a stock line; growth is checked against capacity.
pub async fn update_zone_product(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateQuantityRequest>,
) -> AppResult<Json<DataResponse<ZoneProduct>>> {
    validate_positive_quantity(input.quantity)?;
    let current = ZoneProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("ZoneProduct", id))?;
    let product = ProductRepo::find_by_id(&state.pool, current.product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", current.product_id))?;

    let mut tx = state.pool.begin().await?;
    StorageZoneRepo::lock(&mut tx, current.zone_id).await?;
    let locked = ZoneProductRepo::lock_line(&mut tx, current.zone_id, current.product_id)
        .await?
        .ok_or_else(|| AppError::not_found("ZoneProduct", id))?;

    let growth = input.quantity - locked.quantity;
    if growth > 0 {
        let load = StorageZoneRepo::load_in(&mut tx, current.zone_id)
            .await?
            .ok_or_else(|| AppError::not_found("StorageZone", current.zone_id))?;
        check_fits(&to_load(&load), line_volume(growth, product.volume_m3))?;
    }
    let line = ZoneProductRepo::set_quantity_in(&mut tx, id, input.quantity)
        .await?
        .ok_or_else(|| AppError::not_found("ZoneProduct", id))?;
    tx.commit().await?;

    Ok(Json(DataResponse { data: line }))
}

/// DELETE /api/v1/zone-products/{id}
pub async fn delete_zone_product(
    State(state): State<AppState>,
    RequireStorekeeper(_employee): RequireStorekeeper,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ZoneProductRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("ZoneProduct", id))
    }
}

// ---------------------------------------------------------------------------
// Occupancy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ZoneOccupancy {
    pub zone_id: DbId,
    pub code: String,
    #[serde(flatten)]
    pub occupancy: Occupancy,
}

#[derive(Debug, Serialize)]
pub struct ShelfOccupancy {
    pub shelf_id: DbId,
    pub code: String,
    #[serde(flatten)]
    pub occupancy: Occupancy,
    pub zones: Vec<ZoneOccupancy>,
}

#[derive(Debug, Serialize)]
pub struct WarehouseOccupancy {
    pub warehouse_id: DbId,
    pub name: String,
    #[serde(flatten)]
    pub occupancy: Occupancy,
    pub shelves: Vec<ShelfOccupancy>,
}

fn to_load(row: &ZoneLoadRow) -> ZoneLoad {
    ZoneLoad::new(row.capacity_m3, row.used_m3)
}

fn zone_occupancy(row: &ZoneLoadRow) -> ZoneOccupancy {
    ZoneOccupancy {
        zone_id: row.zone_id,
        code: row.code.clone(),
        occupancy: to_load(row).summary(),
    }
}

/// Build the warehouse → shelf → zone report. Shelves without zones are
/// listed with zero capacity; aggregates are sums, never averages.
pub fn build_warehouse_occupancy(
    warehouse: &Warehouse,
    shelves: &[Shelf],
    rows: &[ZoneLoadRow],
) -> WarehouseOccupancy {
    let mut by_shelf: HashMap<DbId, Vec<&ZoneLoadRow>> = HashMap::new();
    for row in rows {
        by_shelf.entry(row.shelf_id).or_default().push(row);
    }

    let shelves: Vec<ShelfOccupancy> = shelves
        .iter()
        .map(|shelf| {
            let zones = by_shelf.remove(&shelf.id).unwrap_or_default();
            let total = aggregate(zones.iter().map(|r| to_load(r)));
            ShelfOccupancy {
                shelf_id: shelf.id,
                code: shelf.code.clone(),
                occupancy: total.summary(),
                zones: zones.into_iter().map(zone_occupancy).collect(),
            }
        })
        .collect();

    let total = aggregate(rows.iter().map(to_load));
    WarehouseOccupancy {
        warehouse_id: warehouse.id,
        name: warehouse.name.clone(),
        occupancy: total.summary(),
        shelves,
    }
}

/// GET /api/v1/warehouses/{id}/occupancy
pub async fn warehouse_occupancy(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<WarehouseOccupancy>>> {
    let warehouse = WarehouseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Warehouse", id))?;
    let shelves = ShelfRepo::list_by_warehouse(&state.pool, id).await?;
    let rows = WarehouseRepo::zone_loads(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: build_warehouse_occupancy(&warehouse, &shelves, &rows),
    }))
}

/// GET /api/v1/storage-zones/{id}/occupancy
pub async fn zone_occupancy_report(
    State(state): State<AppState>,
    _employee: AuthEmployee,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ZoneOccupancy>>> {
    let row = StorageZoneRepo::load(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("StorageZone", id))?;
    Ok(Json(DataResponse {
        data: zone_occupancy(&row),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_warehouse(state: &AppState, id: DbId) -> AppResult<()> {
    WarehouseRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Warehouse", id))
}

async fn ensure_shelf(state: &AppState, id: DbId) -> AppResult<()> {
    ShelfRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Shelf", id))
}

async fn ensure_zone(state: &AppState, id: DbId) -> AppResult<()> {
    StorageZoneRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("StorageZone", id))
}
