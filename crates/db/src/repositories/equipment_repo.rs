//! Repositories for `equipment_types` and `warehouse_equipment`.

use sqlx::PgPool;
use warehub_core::types::DbId;

use crate::models::equipment::{
    CreateEquipment, CreateEquipmentType, Equipment, EquipmentType, UpdateEquipment,
    UpdateEquipmentType,
};

const TYPE_COLUMNS: &str = "id, name, description, created_at, updated_at";

const COLUMNS: &str = "id, warehouse_id, equipment_type_id, name, inventory_number, status, \
                       commissioned_on, note, created_at, updated_at";

/// Provides CRUD operations for equipment types.
pub struct EquipmentTypeRepo;

impl EquipmentTypeRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateEquipmentType,
    ) -> Result<EquipmentType, sqlx::Error> {
        let query = format!(
            "INSERT INTO equipment_types (name, description) VALUES ($1, $2) RETURNING {TYPE_COLUMNS}"
        );
        sqlx::query_as::<_, EquipmentType>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EquipmentType>, sqlx::Error> {
        let query = format!("SELECT {TYPE_COLUMNS} FROM equipment_types WHERE id = $1");
        sqlx::query_as::<_, EquipmentType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<EquipmentType>, sqlx::Error> {
        let query = format!("SELECT {TYPE_COLUMNS} FROM equipment_types ORDER BY name ASC");
        sqlx::query_as::<_, EquipmentType>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEquipmentType,
    ) -> Result<Option<EquipmentType>, sqlx::Error> {
        let query = format!(
            "UPDATE equipment_types SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {TYPE_COLUMNS}"
        );
        sqlx::query_as::<_, EquipmentType>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM equipment_types WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides CRUD operations for warehouse equipment.
pub struct EquipmentRepo;

impl EquipmentRepo {
    /// Insert equipment. `input.status` must already be validated.
    pub async fn create(
        pool: &PgPool,
        warehouse_id: DbId,
        input: &CreateEquipment,
    ) -> Result<Equipment, sqlx::Error> {
        let query = format!(
            "INSERT INTO warehouse_equipment
                (warehouse_id, equipment_type_id, name, inventory_number, status, commissioned_on, note)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'operational'), $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(warehouse_id)
            .bind(input.equipment_type_id)
            .bind(&input.name)
            .bind(&input.inventory_number)
            .bind(&input.status)
            .bind(input.commissioned_on)
            .bind(&input.note)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM warehouse_equipment WHERE id = $1");
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_warehouse(
        pool: &PgPool,
        warehouse_id: DbId,
    ) -> Result<Vec<Equipment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM warehouse_equipment
             WHERE warehouse_id = $1
             ORDER BY inventory_number ASC"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(warehouse_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEquipment,
    ) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!(
            "UPDATE warehouse_equipment SET
                equipment_type_id = COALESCE($2, equipment_type_id),
                name = COALESCE($3, name),
                inventory_number = COALESCE($4, inventory_number),
                status = COALESCE($5, status),
                commissioned_on = COALESCE($6, commissioned_on),
                note = COALESCE($7, note)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .bind(input.equipment_type_id)
            .bind(&input.name)
            .bind(&input.inventory_number)
            .bind(&input.status)
            .bind(input.commissioned_on)
            .bind(&input.note)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM warehouse_equipment WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
