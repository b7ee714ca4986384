//! Periodic purge of stale sessions and expired registrations.
//!
//! Sessions are kept for a day after they expire or are revoked so recent
//! logouts remain visible; pending verifications go as soon as their code
//! has expired.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use warehub_db::repositories::{SessionRepo, VerificationRepo};

/// How long an expired or revoked session row is kept.
const SESSION_GRACE_HOURS: i64 = 24;

/// Run the cleanup loop every `interval` until `cancel` is triggered.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Cleanup job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cleanup job stopping");
                break;
            }
            _ = ticker.tick() => {
                run_once(&pool).await;
            }
        }
    }
}

/// One purge pass. Failures are logged and retried on the next tick.
pub async fn run_once(pool: &PgPool) {
    let now = Utc::now();

    match SessionRepo::delete_stale(pool, now - chrono::Duration::hours(SESSION_GRACE_HOURS)).await {
        Ok(0) => tracing::debug!("Cleanup: no stale sessions"),
        Ok(deleted) => tracing::info!(deleted, "Cleanup: purged stale sessions"),
        Err(e) => tracing::error!(error = %e, "Cleanup: session purge failed"),
    }

    match VerificationRepo::delete_expired(pool, now).await {
        Ok(0) => tracing::debug!("Cleanup: no expired verifications"),
        Ok(deleted) => tracing::info!(deleted, "Cleanup: purged expired verifications"),
        Err(e) => tracing::error!(error = %e, "Cleanup: verification purge failed"),
    }
}
