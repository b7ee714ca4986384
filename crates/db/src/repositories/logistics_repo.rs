//! Repositories for `vehicles`, `delivery_tasks`, `route_points` and `ttns`.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use warehub_core::statuses::DeliveryTaskStatus;
use warehub_core::types::DbId;

use crate::models::logistics::{
    CreateDeliveryTask, CreateVehicle, DeliveryTask, RoutePoint, TaskFilter, Ttn,
    UpdateDeliveryTask, UpdateVehicle, Vehicle,
};
use crate::{clamp_limit, clamp_offset};

const VEHICLE_COLUMNS: &str = "id, registration_number, model, payload_kg, volume_m3, is_active, \
                               created_at, updated_at";

const TASK_COLUMNS: &str = "id, status, planned_date, vehicle_id, driver_id, note, created_by, \
                            started_at, completed_at, created_at, updated_at";

const POINT_COLUMNS: &str = "id, task_id, sequence, address, client_order_id, planned_arrival, \
                             visited_at, created_at";

const TTN_COLUMNS: &str = "id, task_id, number, issued_by, issued_at";

/// Provides CRUD operations for vehicles.
pub struct VehicleRepo;

impl VehicleRepo {
    /// Insert a vehicle. `registration_number` must already be normalised.
    pub async fn create(pool: &PgPool, input: &CreateVehicle) -> Result<Vehicle, sqlx::Error> {
        let query = format!(
            "INSERT INTO vehicles (registration_number, model, payload_kg, volume_m3)
             VALUES ($1, $2, $3, $4)
             RETURNING {VEHICLE_COLUMNS}"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(&input.registration_number)
            .bind(&input.model)
            .bind(input.payload_kg)
            .bind(input.volume_m3)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1");
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<Vehicle>, sqlx::Error> {
        let query = format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles
             WHERE (NOT $1 OR is_active)
             ORDER BY registration_number ASC"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVehicle,
    ) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!(
            "UPDATE vehicles SET
                registration_number = COALESCE($2, registration_number),
                model = COALESCE($3, model),
                payload_kg = COALESCE($4, payload_kg),
                volume_m3 = COALESCE($5, volume_m3),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {VEHICLE_COLUMNS}"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .bind(&input.registration_number)
            .bind(&input.model)
            .bind(input.payload_kg)
            .bind(input.volume_m3)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides operations on delivery tasks.
pub struct DeliveryTaskRepo;

impl DeliveryTaskRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateDeliveryTask,
    ) -> Result<DeliveryTask, sqlx::Error> {
        let query = format!(
            "INSERT INTO delivery_tasks (planned_date, vehicle_id, driver_id, note, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TASK_COLUMNS}"
        );
        sqlx::query_as::<_, DeliveryTask>(&query)
            .bind(input.planned_date)
            .bind(input.vehicle_id)
            .bind(input.driver_id)
            .bind(&input.note)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DeliveryTask>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM delivery_tasks WHERE id = $1");
        sqlx::query_as::<_, DeliveryTask>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a task row for the rest of the transaction.
    pub async fn lock(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<DeliveryTask>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM delivery_tasks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, DeliveryTask>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List tasks by planned date (latest first) with optional filters.
    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<DeliveryTask>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM delivery_tasks
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR driver_id = $2)
               AND ($3::DATE IS NULL OR planned_date = $3)
             ORDER BY planned_date DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, DeliveryTask>(&query)
            .bind(&filter.status)
            .bind(filter.driver_id)
            .bind(filter.planned_date)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDeliveryTask,
    ) -> Result<Option<DeliveryTask>, sqlx::Error> {
        let query = format!(
            "UPDATE delivery_tasks SET
                planned_date = COALESCE($2, planned_date),
                vehicle_id = COALESCE($3, vehicle_id),
                driver_id = COALESCE($4, driver_id),
                note = COALESCE($5, note)
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        );
        sqlx::query_as::<_, DeliveryTask>(&query)
            .bind(id)
            .bind(input.planned_date)
            .bind(input.vehicle_id)
            .bind(input.driver_id)
            .bind(&input.note)
            .fetch_optional(pool)
            .await
    }

    /// Set the status, stamping `started_at` or `completed_at` when the task
    /// starts or completes.
    pub async fn set_status_in(
        conn: &mut PgConnection,
        id: DbId,
        status: DeliveryTaskStatus,
    ) -> Result<Option<DeliveryTask>, sqlx::Error> {
        let query = format!(
            "UPDATE delivery_tasks SET
                status = $2,
                started_at = CASE WHEN $2 = 'in_progress' THEN NOW() ELSE started_at END,
                completed_at = CASE WHEN $2 = 'completed' THEN NOW() ELSE completed_at END
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        );
        sqlx::query_as::<_, DeliveryTask>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(conn)
            .await
    }

    /// Whether another open task already uses the vehicle on that date.
    pub async fn vehicle_booked(
        pool: &PgPool,
        vehicle_id: DbId,
        date: NaiveDate,
        exclude_task_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM delivery_tasks
                WHERE vehicle_id = $1
                  AND planned_date = $2
                  AND status IN ('planned', 'in_progress')
                  AND ($3::BIGINT IS NULL OR id <> $3)
             )",
        )
        .bind(vehicle_id)
        .bind(date)
        .bind(exclude_task_id)
        .fetch_one(pool)
        .await
    }

    /// Total weight of the orders attached to a task's route points.
    pub async fn load_kg(pool: &PgPool, task_id: DbId) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(op.quantity * p.weight_kg), 0)::DOUBLE PRECISION
             FROM route_points rp
             JOIN ordered_products op ON op.order_id = rp.client_order_id
             JOIN products p ON p.id = op.product_id
             WHERE rp.task_id = $1",
        )
        .bind(task_id)
        .fetch_one(pool)
        .await
    }
}

/// Provides operations on route points.
pub struct RoutePointRepo;

impl RoutePointRepo {
    /// Append a point at the end of a task's route.
    pub async fn append(
        pool: &PgPool,
        task_id: DbId,
        address: &str,
        client_order_id: Option<DbId>,
        planned_arrival: Option<warehub_core::types::Timestamp>,
    ) -> Result<RoutePoint, sqlx::Error> {
        let mut tx = pool.begin().await?;
        DeliveryTaskRepo::lock(&mut tx, task_id).await?;

        let query = format!(
            "INSERT INTO route_points (task_id, sequence, address, client_order_id, planned_arrival)
             VALUES ($1,
                     (SELECT COALESCE(MAX(sequence), 0) + 1 FROM route_points WHERE task_id = $1),
                     $2, $3, $4)
             RETURNING {POINT_COLUMNS}"
        );
        let point = sqlx::query_as::<_, RoutePoint>(&query)
            .bind(task_id)
            .bind(address)
            .bind(client_order_id)
            .bind(planned_arrival)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(point)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RoutePoint>, sqlx::Error> {
        let query = format!("SELECT {POINT_COLUMNS} FROM route_points WHERE id = $1");
        sqlx::query_as::<_, RoutePoint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Points of a task in route order.
    pub async fn list_by_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<RoutePoint>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::list_by_task_in(&mut conn, task_id).await
    }

    pub async fn list_by_task_in(
        conn: &mut PgConnection,
        task_id: DbId,
    ) -> Result<Vec<RoutePoint>, sqlx::Error> {
        let query = format!(
            "SELECT {POINT_COLUMNS} FROM route_points WHERE task_id = $1 ORDER BY sequence ASC"
        );
        sqlx::query_as::<_, RoutePoint>(&query)
            .bind(task_id)
            .fetch_all(conn)
            .await
    }

    /// Whether the order is already on the route of a task that is not
    /// finished or cancelled.
    pub async fn order_in_open_task(pool: &PgPool, order_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM route_points rp
                JOIN delivery_tasks t ON t.id = rp.task_id
                WHERE rp.client_order_id = $1
                  AND t.status IN ('planned', 'in_progress')
             )",
        )
        .bind(order_id)
        .fetch_one(pool)
        .await
    }

    /// Assign sequences `1..=n` in the order of `ordered_ids`.
    ///
    /// The `(task_id, sequence)` constraint is deferred, so intermediate
    /// duplicates inside the transaction are fine.
    pub async fn reorder(
        pool: &PgPool,
        task_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<Vec<RoutePoint>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        for (index, id) in ordered_ids.iter().enumerate() {
            let sequence = i32::try_from(index + 1).unwrap_or(i32::MAX);
            sqlx::query("UPDATE route_points SET sequence = $3 WHERE id = $1 AND task_id = $2")
                .bind(id)
                .bind(task_id)
                .bind(sequence)
                .execute(&mut *tx)
                .await?;
        }

        let points = Self::list_by_task_in(&mut tx, task_id).await?;
        tx.commit().await?;
        Ok(points)
    }

    /// Delete a point and close the gap it leaves in the sequence.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed: Option<(DbId, i32)> = sqlx::query_as(
            "DELETE FROM route_points WHERE id = $1 RETURNING task_id, sequence",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((task_id, sequence)) = removed else {
            return Ok(false);
        };

        sqlx::query(
            "UPDATE route_points SET sequence = sequence - 1 WHERE task_id = $1 AND sequence > $2",
        )
        .bind(task_id)
        .bind(sequence)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Stamp `visited_at`. Returns `None` if the point was already visited.
    pub async fn mark_visited_in(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<RoutePoint>, sqlx::Error> {
        let query = format!(
            "UPDATE route_points SET visited_at = NOW()
             WHERE id = $1 AND visited_at IS NULL
             RETURNING {POINT_COLUMNS}"
        );
        sqlx::query_as::<_, RoutePoint>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }
}

/// Provides operations on waybills.
pub struct TtnRepo;

impl TtnRepo {
    pub async fn create(
        pool: &PgPool,
        task_id: DbId,
        number: &str,
        issued_by: DbId,
    ) -> Result<Ttn, sqlx::Error> {
        let query = format!(
            "INSERT INTO ttns (task_id, number, issued_by) VALUES ($1, $2, $3) RETURNING {TTN_COLUMNS}"
        );
        sqlx::query_as::<_, Ttn>(&query)
            .bind(task_id)
            .bind(number)
            .bind(issued_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_task(pool: &PgPool, task_id: DbId) -> Result<Option<Ttn>, sqlx::Error> {
        let query = format!("SELECT {TTN_COLUMNS} FROM ttns WHERE task_id = $1");
        sqlx::query_as::<_, Ttn>(&query)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }
}
