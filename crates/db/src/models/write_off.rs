//! Write-off acts: requests to remove damaged or lost stock.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WriteOffAct {
    pub id: DbId,
    pub zone_id: DbId,
    pub product_id: DbId,
    pub quantity: i32,
    pub reason: String,
    pub status: String,
    pub created_by: DbId,
    pub decided_by: Option<DbId>,
    pub decision_note: Option<String>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug)]
pub struct CreateWriteOffAct {
    pub zone_id: DbId,
    pub product_id: DbId,
    pub quantity: i32,
    pub reason: String,
    pub created_by: DbId,
}

#[derive(Debug, Default, Deserialize)]
pub struct WriteOffFilter {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
