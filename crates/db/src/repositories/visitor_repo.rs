//! Repository for the `visitors` and `visitor_verifications` tables.

use sqlx::PgPool;
use warehub_core::types::{DbId, Timestamp};

use crate::models::visitor::{CreateVerification, Verification, Visitor};

const COLUMNS: &str = "id, email, password_hash, full_name, phone, role_id, is_active, \
                       last_login_at, created_at, updated_at";

const VERIFICATION_COLUMNS: &str = "id, email, code_hash, password_hash, full_name, phone, \
                                    role_id, attempts, expires_at, sent_at, created_at";

/// Provides operations on visitor accounts.
pub struct VisitorRepo;

impl VisitorRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Visitor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM visitors WHERE id = $1");
        sqlx::query_as::<_, Visitor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a visitor by e-mail. Callers pass the normalised (lower-cased) address.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Visitor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM visitors WHERE email = $1");
        sqlx::query_as::<_, Visitor>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE visitors SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Turn a pending verification into a visitor account.
    ///
    /// Runs in a transaction: the visitor row is inserted from the pending
    /// row's fields and the pending row is deleted.
    pub async fn create_from_verification(
        pool: &PgPool,
        verification_id: DbId,
    ) -> Result<Visitor, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO visitors (email, password_hash, full_name, phone, role_id)
             SELECT email, password_hash, full_name, phone, role_id
             FROM visitor_verifications WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let visitor = sqlx::query_as::<_, Visitor>(&query)
            .bind(verification_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM visitor_verifications WHERE id = $1")
            .bind(verification_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(visitor)
    }
}

/// Provides operations on pending visitor registrations.
pub struct VerificationRepo;

impl VerificationRepo {
    /// Insert a pending registration, or replace the one already pending for
    /// the same e-mail (new code, attempts reset).
    pub async fn upsert(
        pool: &PgPool,
        input: &CreateVerification,
    ) -> Result<Verification, sqlx::Error> {
        let query = format!(
            "INSERT INTO visitor_verifications
                (email, code_hash, password_hash, full_name, phone, role_id, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (email) DO UPDATE SET
                code_hash = EXCLUDED.code_hash,
                password_hash = EXCLUDED.password_hash,
                full_name = EXCLUDED.full_name,
                phone = EXCLUDED.phone,
                role_id = EXCLUDED.role_id,
                expires_at = EXCLUDED.expires_at,
                attempts = 0,
                sent_at = NOW()
             RETURNING {VERIFICATION_COLUMNS}"
        );
        sqlx::query_as::<_, Verification>(&query)
            .bind(&input.email)
            .bind(&input.code_hash)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(input.role_id)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Verification>, sqlx::Error> {
        let query =
            format!("SELECT {VERIFICATION_COLUMNS} FROM visitor_verifications WHERE email = $1");
        sqlx::query_as::<_, Verification>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Spend one verification attempt, returning the row as updated.
    ///
    /// The counter only moves while it is below `max_attempts`, so concurrent
    /// callers can never spend more than the limit. `None` means the attempts
    /// are used up (or the row is gone).
    pub async fn claim_attempt(
        pool: &PgPool,
        id: DbId,
        max_attempts: i32,
    ) -> Result<Option<Verification>, sqlx::Error> {
        let query = format!(
            "UPDATE visitor_verifications SET attempts = attempts + 1
             WHERE id = $1 AND attempts < $2
             RETURNING {VERIFICATION_COLUMNS}"
        );
        sqlx::query_as::<_, Verification>(&query)
            .bind(id)
            .bind(max_attempts)
            .fetch_optional(pool)
            .await
    }

    /// Issue a new code for an existing pending registration.
    pub async fn refresh_code(
        pool: &PgPool,
        id: DbId,
        code_hash: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE visitor_verifications
             SET code_hash = $2, expires_at = $3, attempts = 0, sent_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(code_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete pending registrations whose code expired before `cutoff`.
    pub async fn delete_expired(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM visitor_verifications WHERE expires_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
