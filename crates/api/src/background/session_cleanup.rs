//! Periodic removal of expired sessions.
//!
//! Expired rows are already invisible to lookups; this only keeps the
//! `sap_sessions` table (and the sealed SAP passwords in it) from piling up.

use std::time::Duration;

use sqlx::PgPool;

use nik_db::repositories::SapSessionRepo;

/// How often the cleanup job runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Delete expired sessions once. Returns the number removed.
pub async fn run_once(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let deleted = SapSessionRepo::cleanup_expired(pool).await?;
    if deleted > 0 {
        tracing::info!(deleted, "Session cleanup: removed expired sessions");
    } else {
        tracing::debug!("Session cleanup: nothing to remove");
    }
    Ok(deleted)
}

/// Run the cleanup loop forever. Abort the task to stop it.
pub async fn run(pool: PgPool, every: Duration) {
    tracing::info!(interval_secs = every.as_secs(), "Session cleanup job started");

    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        if let Err(e) = run_once(&pool).await {
            tracing::error!(error = %e, "Session cleanup failed");
        }
    }
}
