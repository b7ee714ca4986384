//! Repository for the `suppliers` table.

use sqlx::PgPool;
use warehub_core::types::DbId;

use crate::models::directory::{CreateSupplier, Supplier, UpdateSupplier};

const COLUMNS: &str = "id, name, inn, address, phone, email, contact_person, visitor_id, \
                       created_at, updated_at";

/// Provides CRUD operations for suppliers.
pub struct SupplierRepo;

impl SupplierRepo {
    pub async fn create(pool: &PgPool, input: &CreateSupplier) -> Result<Supplier, sqlx::Error> {
        let query = format!(
            "INSERT INTO suppliers (name, inn, address, phone, email, contact_person, visitor_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Supplier>(&query)
            .bind(&input.name)
            .bind(&input.inn)
            .bind(&input.address)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.contact_person)
            .bind(input.visitor_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Supplier>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suppliers WHERE id = $1");
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The supplier record a visitor account acts for, if linked.
    pub async fn find_by_visitor(
        pool: &PgPool,
        visitor_id: DbId,
    ) -> Result<Option<Supplier>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM suppliers WHERE visitor_id = $1");
        sqlx::query_as::<_, Supplier>(&query)
            .bind(visitor_id)
            .fetch_optional(pool)
            .await
    }

    /// List suppliers ordered by name, optionally filtered like
    /// [`ClientRepo::list`](super::ClientRepo::list).
    pub async fn list(pool: &PgPool, q: Option<&str>) -> Result<Vec<Supplier>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM suppliers
             WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%' OR inn LIKE $1 || '%')
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Supplier>(&query)
            .bind(q)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSupplier,
    ) -> Result<Option<Supplier>, sqlx::Error> {
        let query = format!(
            "UPDATE suppliers SET
                name = COALESCE($2, name),
                inn = COALESCE($3, inn),
                address = COALESCE($4, address),
                phone = COALESCE($5, phone),
                email = COALESCE($6, email),
                contact_person = COALESCE($7, contact_person)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.inn)
            .bind(&input.address)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.contact_person)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
