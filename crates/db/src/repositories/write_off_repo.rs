//! Repository for the `write_off_acts` table.

use sqlx::PgPool;
use warehub_core::statuses::WriteOffActStatus;
use warehub_core::types::DbId;

use crate::models::write_off::{CreateWriteOffAct, WriteOffAct, WriteOffFilter};
use crate::repositories::ZoneProductRepo;
use crate::{clamp_limit, clamp_offset};

const COLUMNS: &str = "id, zone_id, product_id, quantity, reason, status, created_by, decided_by, \
                       decision_note, decided_at, created_at, updated_at";

/// Why an approval could not be applied to stock.
#[derive(Debug)]
pub enum ApprovalOutcome {
    Approved(WriteOffAct),
    /// The act is no longer pending.
    NotPending(WriteOffAct),
    /// The zone holds fewer units than the act writes off.
    InsufficientStock { available: i32 },
}

/// Provides operations on write-off acts.
pub struct WriteOffActRepo;

impl WriteOffActRepo {
    pub async fn create(pool: &PgPool, input: &CreateWriteOffAct) -> Result<WriteOffAct, sqlx::Error> {
        let query = format!(
            "INSERT INTO write_off_acts (zone_id, product_id, quantity, reason, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WriteOffAct>(&query)
            .bind(input.zone_id)
            .bind(input.product_id)
            .bind(input.quantity)
            .bind(&input.reason)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WriteOffAct>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM write_off_acts WHERE id = $1");
        sqlx::query_as::<_, WriteOffAct>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, filter: &WriteOffFilter) -> Result<Vec<WriteOffAct>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM write_off_acts
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, WriteOffAct>(&query)
            .bind(&filter.status)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// Approve a pending act and take the quantity out of stock.
    ///
    /// The act row and the stock line are both locked `FOR UPDATE`; the stock
    /// line is deleted when it reaches zero. Nothing is written unless every
    /// check passes.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        decided_by: DbId,
        decision_note: Option<&str>,
    ) -> Result<Option<ApprovalOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM write_off_acts WHERE id = $1 FOR UPDATE");
        let Some(act) = sqlx::query_as::<_, WriteOffAct>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if act.status != WriteOffActStatus::Pending.as_str() {
            return Ok(Some(ApprovalOutcome::NotPending(act)));
        }

        let line = ZoneProductRepo::lock_line(&mut tx, act.zone_id, act.product_id).await?;
        let available = line.as_ref().map_or(0, |l| l.quantity);
        let Some(line) = line.filter(|l| l.quantity >= act.quantity) else {
            return Ok(Some(ApprovalOutcome::InsufficientStock { available }));
        };

        let remaining = line.quantity - act.quantity;
        if remaining == 0 {
            ZoneProductRepo::delete_in(&mut tx, line.id).await?;
        } else {
            ZoneProductRepo::set_quantity_in(&mut tx, line.id, remaining).await?;
        }

        let decided = Self::decide_in(
            &mut tx,
            id,
            WriteOffActStatus::Approved,
            decided_by,
            decision_note,
        )
        .await?;

        tx.commit().await?;
        Ok(Some(ApprovalOutcome::Approved(decided)))
    }

    /// Reject a pending act. Returns `None` if the act does not exist or is
    /// no longer pending.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        decided_by: DbId,
        decision_note: Option<&str>,
    ) -> Result<Option<WriteOffAct>, sqlx::Error> {
        let query = format!(
            "UPDATE write_off_acts SET
                status = 'rejected', decided_by = $2, decision_note = $3, decided_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WriteOffAct>(&query)
            .bind(id)
            .bind(decided_by)
            .bind(decision_note)
            .fetch_optional(pool)
            .await
    }

    async fn decide_in(
        conn: &mut sqlx::PgConnection,
        id: DbId,
        status: WriteOffActStatus,
        decided_by: DbId,
        decision_note: Option<&str>,
    ) -> Result<WriteOffAct, sqlx::Error> {
        let query = format!(
            "UPDATE write_off_acts SET
                status = $2, decided_by = $3, decision_note = $4, decided_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WriteOffAct>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(decided_by)
            .bind(decision_note)
            .fetch_one(conn)
            .await
    }
}
