//! Warehouse equipment and its type catalogue.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EquipmentType {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateEquipmentType {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEquipmentType {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Equipment {
    pub id: DbId,
    pub warehouse_id: DbId,
    pub equipment_type_id: DbId,
    pub name: String,
    pub inventory_number: String,
    pub status: String,
    pub commissioned_on: Option<NaiveDate>,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateEquipment {
    pub equipment_type_id: DbId,
    pub name: String,
    pub inventory_number: String,
    pub status: Option<String>,
    pub commissioned_on: Option<NaiveDate>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEquipment {
    pub equipment_type_id: Option<DbId>,
    pub name: Option<String>,
    pub inventory_number: Option<String>,
    pub status: Option<String>,
    pub commissioned_on: Option<NaiveDate>,
    pub note: Option<String>,
}
