//! Repositories for the storage hierarchy: `warehouses`, `shelves`,
//! `storage_zones` and `zone_products`.
//!
//! Occupancy is computed in SQL as `SUM(quantity * products.volume_m3)` per
//! zone; the percentage arithmetic lives in `warehub_core::occupancy`.

use sqlx::{PgConnection, PgPool};
use warehub_core::types::DbId;

use crate::models::storage::{
    CreateShelf, CreateStorageZone, CreateWarehouse, Shelf, StorageZone, UpdateShelf,
    UpdateStorageZone, UpdateWarehouse, Warehouse, ZoneLoadRow, ZoneProduct, ZoneProductDetail,
};

const WAREHOUSE_COLUMNS: &str = "id, name, address, is_active, created_at, updated_at";
const SHELF_COLUMNS: &str = "id, warehouse_id, code, description, created_at, updated_at";
const ZONE_COLUMNS: &str = "id, shelf_id, code, capacity_m3, description, created_at, updated_at";
const ZONE_PRODUCT_COLUMNS: &str = "id, zone_id, product_id, quantity, created_at, updated_at";

const ZONE_PRODUCT_DETAIL_QUERY: &str = "\
    SELECT zp.id, zp.zone_id, zp.product_id, p.article, p.name AS product_name, \
           zp.quantity, p.volume_m3 AS unit_volume_m3, zp.updated_at \
    FROM zone_products zp \
    JOIN products p ON p.id = zp.product_id";

const ZONE_LOAD_QUERY: &str = "\
    SELECT z.id AS zone_id, z.shelf_id, z.code, z.capacity_m3, \
           COALESCE(SUM(zp.quantity * p.volume_m3), 0)::DOUBLE PRECISION AS used_m3 \
    FROM storage_zones z \
    LEFT JOIN zone_products zp ON zp.zone_id = z.id \
    LEFT JOIN products p ON p.id = zp.product_id";

/// Provides CRUD operations for warehouses.
pub struct WarehouseRepo;

impl WarehouseRepo {
    pub async fn create(pool: &PgPool, input: &CreateWarehouse) -> Result<Warehouse, sqlx::Error> {
        let query = format!(
            "INSERT INTO warehouses (name, address) VALUES ($1, $2) RETURNING {WAREHOUSE_COLUMNS}"
        );
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Warehouse>, sqlx::Error> {
        let query = format!("SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE id = $1");
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Warehouse>, sqlx::Error> {
        let query = format!("SELECT {WAREHOUSE_COLUMNS} FROM warehouses ORDER BY name ASC");
        sqlx::query_as::<_, Warehouse>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWarehouse,
    ) -> Result<Option<Warehouse>, sqlx::Error> {
        let query = format!(
            "UPDATE warehouses SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {WAREHOUSE_COLUMNS}"
        );
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Per-zone load of every zone in a warehouse, ordered by shelf then zone code.
    pub async fn zone_loads(
        pool: &PgPool,
        warehouse_id: DbId,
    ) -> Result<Vec<ZoneLoadRow>, sqlx::Error> {
        let query = format!(
            "{ZONE_LOAD_QUERY}
             JOIN shelves s ON s.id = z.shelf_id
             WHERE s.warehouse_id = $1
             GROUP BY z.id, s.code
             ORDER BY s.code ASC, z.code ASC"
        );
        sqlx::query_as::<_, ZoneLoadRow>(&query)
            .bind(warehouse_id)
            .fetch_all(pool)
            .await
    }
}

/// Provides CRUD operations for shelves.
pub struct ShelfRepo;

impl ShelfRepo {
    pub async fn create(
        pool: &PgPool,
        warehouse_id: DbId,
        input: &CreateShelf,
    ) -> Result<Shelf, sqlx::Error> {
        let query = format!(
            "INSERT INTO shelves (warehouse_id, code, description)
             VALUES ($1, $2, $3)
             RETURNING {SHELF_COLUMNS}"
        );
        sqlx::query_as::<_, Shelf>(&query)
            .bind(warehouse_id)
            .bind(&input.code)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Shelf>, sqlx::Error> {
        let query = format!("SELECT {SHELF_COLUMNS} FROM shelves WHERE id = $1");
        sqlx::query_as::<_, Shelf>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_warehouse(
        pool: &PgPool,
        warehouse_id: DbId,
    ) -> Result<Vec<Shelf>, sqlx::Error> {
        let query = format!(
            "SELECT {SHELF_COLUMNS} FROM shelves WHERE warehouse_id = $1 ORDER BY code ASC"
        );
        sqlx::query_as::<_, Shelf>(&query)
            .bind(warehouse_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateShelf,
    ) -> Result<Option<Shelf>, sqlx::Error> {
        let query = format!(
            "UPDATE shelves SET
                code = COALESCE($2, code),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {SHELF_COLUMNS}"
        );
        sqlx::query_as::<_, Shelf>(&query)
            .bind(id)
            .bind(&input.code)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shelves WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides CRUD operations and load queries for storage zones.
pub struct StorageZoneRepo;

impl StorageZoneRepo {
    pub async fn create(
        pool: &PgPool,
        shelf_id: DbId,
        input: &CreateStorageZone,
    ) -> Result<StorageZone, sqlx::Error> {
        let query = format!(
            "INSERT INTO storage_zones (shelf_id, code, capacity_m3, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {ZONE_COLUMNS}"
        );
        sqlx::query_as::<_, StorageZone>(&query)
            .bind(shelf_id)
            .bind(&input.code)
            .bind(input.capacity_m3)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StorageZone>, sqlx::Error> {
        let query = format!("SELECT {ZONE_COLUMNS} FROM storage_zones WHERE id = $1");
        sqlx::query_as::<_, StorageZone>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_shelf(
        pool: &PgPool,
        shelf_id: DbId,
    ) -> Result<Vec<StorageZone>, sqlx::Error> {
        let query = format!(
            "SELECT {ZONE_COLUMNS} FROM storage_zones WHERE shelf_id = $1 ORDER BY code ASC"
        );
        sqlx::query_as::<_, StorageZone>(&query)
            .bind(shelf_id)
            .fetch_all(pool)
            .await
    }

    /// Update a zone on an open transaction.
    ///
    /// Capacity changes are written under the zone row lock taken with
    /// [`lock`](Self::lock), the same lock placements take.
    pub async fn update_in(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateStorageZone,
    ) -> Result<Option<StorageZone>, sqlx::Error> {
        let query = format!(
            "UPDATE storage_zones SET
                code = COALESCE($2, code),
                capacity_m3 = COALESCE($3, capacity_m3),
                description = COALESCE($4, description)
             WHERE id = $1
             RETURNING {ZONE_COLUMNS}"
        );
        sqlx::query_as::<_, StorageZone>(&query)
            .bind(id)
            .bind(&input.code)
            .bind(input.capacity_m3)
            .bind(&input.description)
            .fetch_optional(conn)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM storage_zones WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Capacity and used volume of one zone.
    pub async fn load(pool: &PgPool, zone_id: DbId) -> Result<Option<ZoneLoadRow>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::load_in(&mut conn, zone_id).await
    }

    /// Same as [`load`](Self::load) on an open connection or transaction.
    ///
    /// Callers that go on to write stock take the zone row lock first with
    /// [`lock`](Self::lock) so concurrent placements see each other.
    pub async fn load_in(
        conn: &mut PgConnection,
        zone_id: DbId,
    ) -> Result<Option<ZoneLoadRow>, sqlx::Error> {
        let query = format!("{ZONE_LOAD_QUERY} WHERE z.id = $1 GROUP BY z.id");
        sqlx::query_as::<_, ZoneLoadRow>(&query)
            .bind(zone_id)
            .fetch_optional(conn)
            .await
    }

    /// Lock a zone row for the rest of the transaction.
    pub async fn lock(conn: &mut PgConnection, zone_id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM storage_zones WHERE id = $1 FOR UPDATE")
                .bind(zone_id)
                .fetch_optional(conn)
                .await?;
        Ok(row.is_some())
    }
}

/// Provides stock operations on `zone_products`.
pub struct ZoneProductRepo;

impl ZoneProductRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ZoneProduct>, sqlx::Error> {
        let query = format!("SELECT {ZONE_PRODUCT_COLUMNS} FROM zone_products WHERE id = $1");
        sqlx::query_as::<_, ZoneProduct>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_zone(
        pool: &PgPool,
        zone_id: DbId,
    ) -> Result<Vec<ZoneProductDetail>, sqlx::Error> {
        let query = format!("{ZONE_PRODUCT_DETAIL_QUERY} WHERE zp.zone_id = $1 ORDER BY p.name ASC");
        sqlx::query_as::<_, ZoneProductDetail>(&query)
            .bind(zone_id)
            .fetch_all(pool)
            .await
    }

    /// Add `quantity` units of a product to a zone, merging with an existing
    /// line for the same product.
    pub async fn add_in(
        conn: &mut PgConnection,
        zone_id: DbId,
        product_id: DbId,
        quantity: i32,
    ) -> Result<ZoneProduct, sqlx::Error> {
        let query = format!(
            "INSERT INTO zone_products (zone_id, product_id, quantity)
             VALUES ($1, $2, $3)
             ON CONFLICT (zone_id, product_id)
             DO UPDATE SET quantity = zone_products.quantity + EXCLUDED.quantity
             RETURNING {ZONE_PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, ZoneProduct>(&query)
            .bind(zone_id)
            .bind(product_id)
            .bind(quantity)
            .fetch_one(conn)
            .await
    }

    pub async fn set_quantity_in(
        conn: &mut PgConnection,
        id: DbId,
        quantity: i32,
    ) -> Result<Option<ZoneProduct>, sqlx::Error> {
        let query = format!(
            "UPDATE zone_products SET quantity = $2 WHERE id = $1 RETURNING {ZONE_PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, ZoneProduct>(&query)
            .bind(id)
            .bind(quantity)
            .fetch_optional(conn)
            .await
    }

    /// Lock the stock line of a product in a zone for the rest of the transaction.
    pub async fn lock_line(
        conn: &mut PgConnection,
        zone_id: DbId,
        product_id: DbId,
    ) -> Result<Option<ZoneProduct>, sqlx::Error> {
        let query = format!(
            "SELECT {ZONE_PRODUCT_COLUMNS} FROM zone_products
             WHERE zone_id = $1 AND product_id = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, ZoneProduct>(&query)
            .bind(zone_id)
            .bind(product_id)
            .fetch_optional(conn)
            .await
    }

    pub async fn delete_in(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM zone_products WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::delete_in(&mut conn, id).await
    }
}
