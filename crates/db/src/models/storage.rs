//! Physical storage hierarchy: warehouse -> shelf -> storage zone -> stock.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Warehouse {
    pub id: DbId,
    pub name: String,
    pub address: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouse {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateWarehouse {
    pub name: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Shelf {
    pub id: DbId,
    pub warehouse_id: DbId,
    pub code: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateShelf {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateShelf {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StorageZone {
    pub id: DbId,
    pub shelf_id: DbId,
    pub code: String,
    pub capacity_m3: f64,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateStorageZone {
    pub code: String,
    pub capacity_m3: f64,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStorageZone {
    pub code: Option<String>,
    pub capacity_m3: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ZoneProduct {
    pub id: DbId,
    pub zone_id: DbId,
    pub product_id: DbId,
    pub quantity: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Stock line joined with the product fields needed for display and
/// occupancy.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ZoneProductDetail {
    pub id: DbId,
    pub zone_id: DbId,
    pub product_id: DbId,
    pub article: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_volume_m3: f64,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct PlaceProduct {
    pub product_id: DbId,
    pub quantity: i32,
}

/// Capacity and used volume of one zone, computed in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct ZoneLoadRow {
    pub zone_id: DbId,
    pub shelf_id: DbId,
    pub code: String,
    pub capacity_m3: f64,
    pub used_m3: f64,
}
