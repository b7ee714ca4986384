//! Client orders, their lines and discussion comments.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientOrder {
    pub id: DbId,
    pub client_id: DbId,
    pub status: String,
    pub delivery_address: String,
    pub total_cents: i64,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order line joined with product fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderedProductDetail {
    pub id: DbId,
    pub order_id: DbId,
    pub product_id: DbId,
    pub article: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub unit_weight_kg: f64,
}

/// A priced line ready for insertion. Prices are snapshotted from the
/// product at order time.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: DbId,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

#[derive(Debug)]
pub struct CreateClientOrder {
    pub client_id: DbId,
    pub delivery_address: String,
    pub note: Option<String>,
    /// Sum of the lines, computed by the caller.
    pub total_cents: i64,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub client_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub order_id: DbId,
    /// `employee` or `visitor`.
    pub author_kind: String,
    pub author_id: DbId,
    pub author_name: String,
    pub body: String,
    pub created_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateComment {
    pub order_id: DbId,
    pub author_kind: String,
    pub author_id: DbId,
    pub author_name: String,
    pub body: String,
}
