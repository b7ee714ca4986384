//! Repositories for the supplier side: `delivery_requests`,
//! `requested_products`, `deliveries`, `acceptance_acts` and `supplies`.

use sqlx::{PgConnection, PgPool};
use warehub_core::statuses::RequestStatus;
use warehub_core::types::DbId;

use crate::models::supply::{
    AcceptanceAct, AcceptanceActLine, CreateAcceptanceAct, CreateDelivery, CreateDeliveryRequest,
    Delivery, DeliveryRequest, RequestFilter, RequestedProductDetail, Supply,
};
use crate::{clamp_limit, clamp_offset};

const COLUMNS: &str = "id, supplier_id, warehouse_id, status, expected_date, note, created_by, \
                       created_at, updated_at";

const DELIVERY_COLUMNS: &str = "id, request_id, carrier, vehicle_info, tracking_number, \
                                shipped_at, expected_at";

const ACT_COLUMNS: &str = "id, request_id, accepted_by, note, created_at";

const SUPPLY_COLUMNS: &str = "id, request_id, supplier_id, warehouse_id, total_quantity, completed_at";

/// Provides operations on requests for delivery.
pub struct DeliveryRequestRepo;

impl DeliveryRequestRepo {
    /// Insert a request with its product lines in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDeliveryRequest,
    ) -> Result<DeliveryRequest, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO delivery_requests (supplier_id, warehouse_id, expected_date, note, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, DeliveryRequest>(&query)
            .bind(input.supplier_id)
            .bind(input.warehouse_id)
            .bind(input.expected_date)
            .bind(&input.note)
            .bind(input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        for line in &input.lines {
            sqlx::query(
                "INSERT INTO requested_products (request_id, product_id, quantity)
                 VALUES ($1, $2, $3)",
            )
            .bind(request.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(request)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DeliveryRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM delivery_requests WHERE id = $1");
        sqlx::query_as::<_, DeliveryRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a request row for the rest of the transaction.
    pub async fn lock(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<DeliveryRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM delivery_requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, DeliveryRequest>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List requests newest first. With `hide_new`, requests still in `new`
    /// are left out; suppliers never see drafts.
    pub async fn list(
        pool: &PgPool,
        filter: &RequestFilter,
        hide_new: bool,
    ) -> Result<Vec<DeliveryRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM delivery_requests
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR supplier_id = $2)
               AND (NOT $3 OR status <> 'new')
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, DeliveryRequest>(&query)
            .bind(&filter.status)
            .bind(filter.supplier_id)
            .bind(hide_new)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    pub async fn lines(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<RequestedProductDetail>, sqlx::Error> {
        sqlx::query_as::<_, RequestedProductDetail>(
            "SELECT rp.id, rp.request_id, rp.product_id, p.article, p.name AS product_name,
                    rp.quantity
             FROM requested_products rp
             JOIN products p ON p.id = rp.product_id
             WHERE rp.request_id = $1
             ORDER BY rp.id ASC",
        )
        .bind(request_id)
        .fetch_all(pool)
        .await
    }

    pub async fn set_status_in(
        conn: &mut PgConnection,
        id: DbId,
        status: RequestStatus,
    ) -> Result<Option<DeliveryRequest>, sqlx::Error> {
        let query =
            format!("UPDATE delivery_requests SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, DeliveryRequest>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(conn)
            .await
    }

    /// Record the shipment details sent by the supplier.
    pub async fn record_delivery_in(
        conn: &mut PgConnection,
        request_id: DbId,
        input: &CreateDelivery,
    ) -> Result<Delivery, sqlx::Error> {
        let query = format!(
            "INSERT INTO deliveries (request_id, carrier, vehicle_info, tracking_number, expected_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {DELIVERY_COLUMNS}"
        );
        sqlx::query_as::<_, Delivery>(&query)
            .bind(request_id)
            .bind(&input.carrier)
            .bind(&input.vehicle_info)
            .bind(&input.tracking_number)
            .bind(input.expected_at)
            .fetch_one(conn)
            .await
    }

    pub async fn find_delivery(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Option<Delivery>, sqlx::Error> {
        let query = format!("SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE request_id = $1");
        sqlx::query_as::<_, Delivery>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }
}

/// Provides operations on acceptance acts.
pub struct AcceptanceActRepo;

impl AcceptanceActRepo {
    /// Insert an act with its lines in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAcceptanceAct,
    ) -> Result<AcceptanceAct, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO acceptance_acts (request_id, accepted_by, note)
             VALUES ($1, $2, $3)
             RETURNING {ACT_COLUMNS}"
        );
        let act = sqlx::query_as::<_, AcceptanceAct>(&query)
            .bind(input.request_id)
            .bind(input.accepted_by)
            .bind(&input.note)
            .fetch_one(&mut *tx)
            .await?;

        for line in &input.lines {
            sqlx::query(
                "INSERT INTO acceptance_act_lines (act_id, requested_product_id, accepted_quantity)
                 VALUES ($1, $2, $3)",
            )
            .bind(act.id)
            .bind(line.requested_product_id)
            .bind(line.accepted_quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(act)
    }

    pub async fn find_by_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Option<AcceptanceAct>, sqlx::Error> {
        let query = format!("SELECT {ACT_COLUMNS} FROM acceptance_acts WHERE request_id = $1");
        sqlx::query_as::<_, AcceptanceAct>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists_in(conn: &mut PgConnection, request_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM acceptance_acts WHERE request_id = $1)")
            .bind(request_id)
            .fetch_one(conn)
            .await
    }

    pub async fn lines(pool: &PgPool, act_id: DbId) -> Result<Vec<AcceptanceActLine>, sqlx::Error> {
        sqlx::query_as::<_, AcceptanceActLine>(
            "SELECT id, act_id, requested_product_id, accepted_quantity
             FROM acceptance_act_lines WHERE act_id = $1 ORDER BY id ASC",
        )
        .bind(act_id)
        .fetch_all(pool)
        .await
    }
}

/// Provides operations on completed supplies.
pub struct SupplyRepo;

impl SupplyRepo {
    /// Write the supply record for a request, totalling the accepted
    /// quantities of its acceptance act.
    pub async fn create_in(
        conn: &mut PgConnection,
        request: &DeliveryRequest,
    ) -> Result<Supply, sqlx::Error> {
        let query = format!(
            "INSERT INTO supplies (request_id, supplier_id, warehouse_id, total_quantity)
             SELECT $1, $2, $3, COALESCE(SUM(l.accepted_quantity), 0)::BIGINT
             FROM acceptance_acts a
             LEFT JOIN acceptance_act_lines l ON l.act_id = a.id
             WHERE a.request_id = $1
             RETURNING {SUPPLY_COLUMNS}"
        );
        sqlx::query_as::<_, Supply>(&query)
            .bind(request.id)
            .bind(request.supplier_id)
            .bind(request.warehouse_id)
            .fetch_one(conn)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        supplier_id: Option<DbId>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Supply>, sqlx::Error> {
        let query = format!(
            "SELECT {SUPPLY_COLUMNS} FROM supplies
             WHERE ($1::BIGINT IS NULL OR supplier_id = $1)
             ORDER BY completed_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Supply>(&query)
            .bind(supplier_id)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }
}
