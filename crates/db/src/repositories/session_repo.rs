//! Repository for the `sessions` table.

use sqlx::PgPool;
use warehub_core::types::{DbId, Timestamp};

use crate::models::session::{CreateSession, Session};

const COLUMNS: &str = "id, principal_kind, principal_id, refresh_token_hash, expires_at, \
                       revoked_at, user_agent, created_at";

/// Provides refresh-token session operations for both principal kinds.
pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (principal_kind, principal_id, refresh_token_hash, expires_at, user_agent)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(&input.principal_kind)
            .bind(input.principal_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .fetch_one(pool)
            .await
    }

    /// Find an active (not revoked, not expired) session of the given kind
    /// by refresh token hash.
    pub async fn find_active(
        pool: &PgPool,
        principal_kind: &str,
        refresh_token_hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE principal_kind = $1
               AND refresh_token_hash = $2
               AND revoked_at IS NULL
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(principal_kind)
            .bind(refresh_token_hash)
            .fetch_optional(pool)
            .await
    }

    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE sessions SET revoked_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Revoke every open session of one principal. Returns the number revoked.
    pub async fn revoke_all_for(
        pool: &PgPool,
        principal_kind: &str,
        principal_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW()
             WHERE principal_kind = $1 AND principal_id = $2 AND revoked_at IS NULL",
        )
        .bind(principal_kind)
        .bind(principal_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions that expired or were revoked before `cutoff`.
    pub async fn delete_stale(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE expires_at < $1 OR revoked_at < $1")
                .bind(cutoff)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
