//! Repository for the `notifications` table.

use sqlx::PgPool;
use warehub_core::types::DbId;

use crate::models::notification::{CreateNotification, Notification};
use crate::{clamp_limit, clamp_offset};

const COLUMNS: &str = "id, recipient_kind, recipient_id, title, body, entity_type, entity_id, \
                       is_read, created_at";

/// Provides operations on in-app notifications.
///
/// Every read and update is scoped by `(recipient_kind, recipient_id)` so a
/// principal can only see or mark its own rows.
pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (recipient_kind, recipient_id, title, body, entity_type, entity_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(&input.recipient_kind)
            .bind(input.recipient_id)
            .bind(&input.title)
            .bind(&input.body)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .fetch_one(pool)
            .await
    }

    /// List a recipient's notifications newest first.
    pub async fn list_for(
        pool: &PgPool,
        recipient_kind: &str,
        recipient_id: DbId,
        unread_only: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE recipient_kind = $1 AND recipient_id = $2
               AND (NOT $3 OR is_read = false)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(recipient_kind)
            .bind(recipient_id)
            .bind(unread_only)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Mark one notification read. Returns `false` if it does not exist or
    /// belongs to someone else.
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        recipient_kind: &str,
        recipient_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true
             WHERE id = $1 AND recipient_kind = $2 AND recipient_id = $3",
        )
        .bind(id)
        .bind(recipient_kind)
        .bind(recipient_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all of a recipient's notifications read. Returns the count updated.
    pub async fn mark_all_read(
        pool: &PgPool,
        recipient_kind: &str,
        recipient_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true
             WHERE recipient_kind = $1 AND recipient_id = $2 AND is_read = false",
        )
        .bind(recipient_kind)
        .bind(recipient_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_count(
        pool: &PgPool,
        recipient_kind: &str,
        recipient_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications
             WHERE recipient_kind = $1 AND recipient_id = $2 AND is_read = false",
        )
        .bind(recipient_kind)
        .bind(recipient_id)
        .fetch_one(pool)
        .await
    }
}
