//! Repositories for the catalog: `product_categories`, `products` and
//! `product_attributes`.

use sqlx::PgPool;
use warehub_core::types::DbId;

use crate::models::product::{
    AttributeInput, CreateProduct, CreateProductCategory, Product, ProductAttribute,
    ProductCategory, ProductFilter, UpdateProduct, UpdateProductCategory,
};

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";

const COLUMNS: &str = "id, article, name, description, category_id, unit, weight_kg, volume_m3, \
                       price_cents, image_path, is_active, created_at, updated_at";

/// Provides CRUD operations for product categories.
pub struct ProductCategoryRepo;

impl ProductCategoryRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateProductCategory,
    ) -> Result<ProductCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_categories (name, description)
             VALUES ($1, $2)
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, ProductCategory>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProductCategory>, sqlx::Error> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM product_categories WHERE id = $1");
        sqlx::query_as::<_, ProductCategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<ProductCategory>, sqlx::Error> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM product_categories ORDER BY name ASC");
        sqlx::query_as::<_, ProductCategory>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProductCategory,
    ) -> Result<Option<ProductCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE product_categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, ProductCategory>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category. Products in it keep existing with no category.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM product_categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides CRUD operations for products and their attributes.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a product. `input.article` must already be normalised.
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products
                (article, name, description, category_id, unit, weight_kg, volume_m3, price_cents)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'pcs'), $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(&input.article)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.category_id)
            .bind(&input.unit)
            .bind(input.weight_kg)
            .bind(input.volume_m3)
            .bind(input.price_cents)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch several products at once, in no particular order.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = ANY($1)");
        sqlx::query_as::<_, Product>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List products matching `filter`, ordered by name.
    pub async fn list(pool: &PgPool, filter: &ProductFilter) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products
             WHERE ($1::BIGINT IS NULL OR category_id = $1)
               AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%' OR article ILIKE '%' || $2 || '%')
               AND (NOT $3 OR is_active)
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(filter.category_id)
            .bind(&filter.q)
            .bind(filter.active_only)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                article = COALESCE($2, article),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                category_id = COALESCE($5, category_id),
                unit = COALESCE($6, unit),
                weight_kg = COALESCE($7, weight_kg),
                volume_m3 = COALESCE($8, volume_m3),
                price_cents = COALESCE($9, price_cents),
                is_active = COALESCE($10, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&input.article)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.category_id)
            .bind(&input.unit)
            .bind(input.weight_kg)
            .bind(input.volume_m3)
            .bind(input.price_cents)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Record the stored image path. Returns the previous path so the caller
    /// can remove the old file.
    pub async fn set_image_path(
        pool: &PgPool,
        id: DbId,
        image_path: &str,
    ) -> Result<Option<Option<String>>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE products p SET image_path = $2
             FROM (SELECT id, image_path FROM products WHERE id = $1 FOR UPDATE) old
             WHERE p.id = old.id
             RETURNING old.image_path",
        )
        .bind(id)
        .bind(image_path)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_attributes(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<ProductAttribute>, sqlx::Error> {
        sqlx::query_as::<_, ProductAttribute>(
            "SELECT id, product_id, name, value FROM product_attributes
             WHERE product_id = $1 ORDER BY name ASC",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await
    }

    /// Replace the whole attribute set of a product in one transaction.
    pub async fn replace_attributes(
        pool: &PgPool,
        product_id: DbId,
        attributes: &[AttributeInput],
    ) -> Result<Vec<ProductAttribute>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM product_attributes WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(attributes.len());
        for attr in attributes {
            let row = sqlx::query_as::<_, ProductAttribute>(
                "INSERT INTO product_attributes (product_id, name, value)
                 VALUES ($1, $2, $3)
                 RETURNING id, product_id, name, value",
            )
            .bind(product_id)
            .bind(&attr.name)
            .bind(&attr.value)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row);
        }

        tx.commit().await?;
        saved.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(saved)
    }
}
