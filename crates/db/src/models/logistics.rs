//! Vehicles, delivery tasks, their route points and waybills (TTN).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vehicle {
    pub id: DbId,
    pub registration_number: String,
    pub model: String,
    pub payload_kg: f64,
    pub volume_m3: f64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateVehicle {
    pub registration_number: String,
    pub model: String,
    pub payload_kg: f64,
    #[serde(default)]
    pub volume_m3: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateVehicle {
    pub registration_number: Option<String>,
    pub model: Option<String>,
    pub payload_kg: Option<f64>,
    pub volume_m3: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeliveryTask {
    pub id: DbId,
    pub status: String,
    pub planned_date: NaiveDate,
    pub vehicle_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub note: Option<String>,
    pub created_by: DbId,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateDeliveryTask {
    pub planned_date: NaiveDate,
    pub vehicle_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub note: Option<String>,
    pub created_by: DbId,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDeliveryTask {
    pub planned_date: Option<NaiveDate>,
    pub vehicle_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub note: Option<String>,
}

/// Optional filters for task listing.
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub driver_id: Option<DbId>,
    pub planned_date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoutePoint {
    pub id: DbId,
    pub task_id: DbId,
    pub sequence: i32,
    pub address: String,
    pub client_order_id: Option<DbId>,
    pub planned_arrival: Option<Timestamp>,
    pub visited_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoutePoint {
    pub address: Option<String>,
    pub client_order_id: Option<DbId>,
    pub planned_arrival: Option<Timestamp>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ttn {
    pub id: DbId,
    pub task_id: DbId,
    pub number: String,
    pub issued_by: DbId,
    pub issued_at: Timestamp,
}
