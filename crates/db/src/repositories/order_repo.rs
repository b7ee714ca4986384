//! Repositories for `client_orders`, `ordered_products` and `comments`.

use sqlx::{PgConnection, PgPool};
use warehub_core::types::DbId;

use crate::models::order::{
    ClientOrder, Comment, CreateClientOrder, CreateComment, OrderFilter, OrderedProductDetail,
};
use crate::{clamp_limit, clamp_offset};

const COLUMNS: &str = "id, client_id, status, delivery_address, total_cents, note, \
                       created_at, updated_at";

const COMMENT_COLUMNS: &str = "id, order_id, author_kind, author_id, author_name, body, created_at";

/// Provides operations on client orders and their lines.
pub struct ClientOrderRepo;

impl ClientOrderRepo {
    /// Insert an order with all of its lines in one transaction.
    ///
    /// The stored total is the sum of `quantity * unit_price_cents` over the
    /// lines, so header and lines always agree.
    pub async fn create(
        pool: &PgPool,
        input: &CreateClientOrder,
    ) -> Result<ClientOrder, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO client_orders (client_id, delivery_address, total_cents, note)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, ClientOrder>(&query)
            .bind(input.client_id)
            .bind(&input.delivery_address)
            .bind(input.total_cents)
            .bind(&input.note)
            .fetch_one(&mut *tx)
            .await?;

        for line in &input.lines {
            sqlx::query(
                "INSERT INTO ordered_products (order_id, product_id, quantity, unit_price_cents)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ClientOrder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM client_orders WHERE id = $1");
        sqlx::query_as::<_, ClientOrder>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock an order row for the rest of the transaction.
    pub async fn lock(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ClientOrder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM client_orders WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ClientOrder>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List orders newest first, filtered by status and/or client.
    pub async fn list(pool: &PgPool, filter: &OrderFilter) -> Result<Vec<ClientOrder>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM client_orders
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR client_id = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ClientOrder>(&query)
            .bind(&filter.status)
            .bind(filter.client_id)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    pub async fn lines(
        pool: &PgPool,
        order_id: DbId,
    ) -> Result<Vec<OrderedProductDetail>, sqlx::Error> {
        sqlx::query_as::<_, OrderedProductDetail>(
            "SELECT op.id, op.order_id, op.product_id, p.article, p.name AS product_name,
                    op.quantity, op.unit_price_cents, p.weight_kg AS unit_weight_kg
             FROM ordered_products op
             JOIN products p ON p.id = op.product_id
             WHERE op.order_id = $1
             ORDER BY op.id ASC",
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }

    /// Total cargo weight of an order.
    pub async fn weight_kg(pool: &PgPool, order_id: DbId) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(op.quantity * p.weight_kg), 0)::DOUBLE PRECISION
             FROM ordered_products op
             JOIN products p ON p.id = op.product_id
             WHERE op.order_id = $1",
        )
        .bind(order_id)
        .fetch_one(pool)
        .await
    }

    /// Set the status unconditionally. Callers check the transition first.
    pub async fn set_status_in(
        conn: &mut PgConnection,
        id: DbId,
        status: &str,
    ) -> Result<Option<ClientOrder>, sqlx::Error> {
        let query =
            format!("UPDATE client_orders SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, ClientOrder>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(conn)
            .await
    }
}

/// Provides operations on order comments.
pub struct CommentRepo;

impl CommentRepo {
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (order_id, author_kind, author_id, author_name, body)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COMMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.order_id)
            .bind(&input.author_kind)
            .bind(input.author_id)
            .bind(&input.author_name)
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    /// Comments on an order, oldest first.
    pub async fn list_by_order(pool: &PgPool, order_id: DbId) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE order_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(order_id)
            .fetch_all(pool)
            .await
    }
}
