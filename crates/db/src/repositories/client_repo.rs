//! Repository for the `clients` table.

use sqlx::PgPool;
use warehub_core::types::DbId;

use crate::models::directory::{Client, CreateClient, UpdateClient};

const COLUMNS: &str = "id, name, inn, address, phone, email, visitor_id, created_at, updated_at";

/// Provides CRUD operations for client companies.
pub struct ClientRepo;

impl ClientRepo {
    pub async fn create(pool: &PgPool, input: &CreateClient) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients (name, inn, address, phone, email, visitor_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(&input.name)
            .bind(&input.inn)
            .bind(&input.address)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(input.visitor_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The client record a visitor account acts for, if linked.
    pub async fn find_by_visitor(
        pool: &PgPool,
        visitor_id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE visitor_id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(visitor_id)
            .fetch_optional(pool)
            .await
    }

    /// List clients ordered by name, optionally filtered by a case-insensitive
    /// substring of the name or a prefix of the INN.
    pub async fn list(pool: &PgPool, q: Option<&str>) -> Result<Vec<Client>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM clients
             WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%' OR inn LIKE $1 || '%')
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(q)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET
                name = COALESCE($2, name),
                inn = COALESCE($3, inn),
                address = COALESCE($4, address),
                phone = COALESCE($5, phone),
                email = COALESCE($6, email)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.inn)
            .bind(&input.address)
            .bind(&input.phone)
            .bind(&input.email)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
