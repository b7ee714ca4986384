//! Supplier side: requests for delivery, shipments, acceptance acts and
//! completed supplies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeliveryRequest {
    pub id: DbId,
    pub supplier_id: DbId,
    pub warehouse_id: DbId,
    pub status: String,
    pub expected_date: Option<NaiveDate>,
    pub note: Option<String>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RequestedProductDetail {
    pub id: DbId,
    pub request_id: DbId,
    pub product_id: DbId,
    pub article: String,
    pub product_name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestLine {
    pub product_id: DbId,
    pub quantity: i32,
}

#[derive(Debug)]
pub struct CreateDeliveryRequest {
    pub supplier_id: DbId,
    pub warehouse_id: DbId,
    pub expected_date: Option<NaiveDate>,
    pub note: Option<String>,
    pub created_by: DbId,
    pub lines: Vec<RequestLine>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestFilter {
    pub status: Option<String>,
    pub supplier_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Shipment details recorded when a supplier marks a request shipped.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Delivery {
    pub id: DbId,
    pub request_id: DbId,
    pub carrier: Option<String>,
    pub vehicle_info: Option<String>,
    pub tracking_number: Option<String>,
    pub shipped_at: Timestamp,
    pub expected_at: Option<Timestamp>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CreateDelivery {
    pub carrier: Option<String>,
    pub vehicle_info: Option<String>,
    pub tracking_number: Option<String>,
    pub expected_at: Option<Timestamp>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AcceptanceAct {
    pub id: DbId,
    pub request_id: DbId,
    pub accepted_by: DbId,
    pub note: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AcceptanceActLine {
    pub id: DbId,
    pub act_id: DbId,
    pub requested_product_id: DbId,
    pub accepted_quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcceptedLine {
    pub requested_product_id: DbId,
    pub accepted_quantity: i32,
}

#[derive(Debug)]
pub struct CreateAcceptanceAct {
    pub request_id: DbId,
    pub accepted_by: DbId,
    pub note: Option<String>,
    pub lines: Vec<AcceptedLine>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Supply {
    pub id: DbId,
    pub request_id: DbId,
    pub supplier_id: DbId,
    pub warehouse_id: DbId,
    pub total_quantity: i64,
    pub completed_at: Timestamp,
}
