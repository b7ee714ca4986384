//! Catalog: categories, products and free-form product attributes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warehub_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductCategory {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductCategory {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub article: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub unit: String,
    pub weight_kg: f64,
    pub volume_m3: f64,
    /// Price in minor currency units.
    pub price_cents: i64,
    /// Path relative to the media directory, if an image was uploaded.
    pub image_path: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub article: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub unit: Option<String>,
    #[serde(default)]
    pub weight_kg: f64,
    #[serde(default)]
    pub volume_m3: f64,
    #[serde(default)]
    pub price_cents: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProduct {
    pub article: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub unit: Option<String>,
    pub weight_kg: Option<f64>,
    pub volume_m3: Option<f64>,
    pub price_cents: Option<i64>,
    pub is_active: Option<bool>,
}

/// Optional filters for product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<DbId>,
    /// Case-insensitive substring of the name or article.
    pub q: Option<String>,
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductAttribute {
    pub id: DbId,
    pub product_id: DbId,
    pub name: String,
    pub value: String,
}

/// One attribute in a replace-all request.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeInput {
    pub name: String,
    pub value: String,
}
