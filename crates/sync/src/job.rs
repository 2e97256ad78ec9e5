//! The sync job and its advisory-lock guard.

use chrono::Utc;
use sqlx::{Connection, PgConnection, PgPool};

use nik_core::nik::normalize_record;
use nik_core::sync::{StoreStatistics, SyncStatistics, SYNC_LOCK_ID};
use nik_db::models::nik_confirmation::CreateNikConfirmation;
use nik_db::repositories::NikConfirmationRepo;
use nik_sap::messages::SapRecord;
use nik_sap::{ListFilter, SapCredentials, SapGateway};

use crate::error::SyncError;

/// Replaces the local mirror with the SAP feed.
///
/// Cheap to clone; a clone can be moved into a spawned task.
#[derive(Debug, Clone)]
pub struct SyncJob {
    pool: PgPool,
    gateway: SapGateway,
    /// Service account used for the fetch, distinct from any user session.
    credentials: Option<SapCredentials>,
}

impl SyncJob {
    pub fn new(pool: PgPool, gateway: SapGateway, credentials: Option<SapCredentials>) -> Self {
        Self {
            pool,
            gateway,
            credentials,
        }
    }

    /// Run one sync.
    ///
    /// Fails before any network call when no service credentials are
    /// configured, and before touching the store when the fetch fails. An
    /// empty feed leaves the store unchanged.
    pub async fn run(&self, filter: &ListFilter) -> Result<SyncStatistics, SyncError> {
        let creds = self
            .credentials
            .as_ref()
            .filter(|c| !c.username.is_empty() && !c.password().is_empty())
            .ok_or(SyncError::MisconfiguredCredentials)?;

        tracing::info!(
            pernr = filter.pernr.as_deref(),
            werks = filter.werks.as_deref(),
            "Starting NIK confirmation sync",
        );

        let mut conn = self.lock().await?;
        let result = self.replace(&mut conn, creds, filter).await;
        Self::unlock(conn).await;

        match &result {
            Ok(stats) => tracing::info!(
                fetched = stats.fetched,
                inserted = stats.inserted,
                deleted = stats.deleted,
                skipped = stats.skipped,
                errors = stats.errors,
                "NIK confirmation sync completed",
            ),
            Err(e) => tracing::error!(error = %e, "NIK confirmation sync failed"),
        }
        result
    }

    /// Run one sync on a spawned task and wait for it.
    ///
    /// The sync keeps going if the caller is dropped (for example when an
    /// HTTP client disconnects).
    pub async fn run_detached(self, filter: ListFilter) -> Result<SyncStatistics, SyncError> {
        tokio::spawn(async move { self.run(&filter).await })
            .await
            .map_err(|e| SyncError::Interrupted(e.to_string()))?
    }

    /// Delete every local row. Returns the number removed.
    ///
    /// Takes the sync lock so it cannot interleave with a running sync.
    pub async fn clear_all(&self) -> Result<u64, SyncError> {
        let mut conn = self.lock().await?;
        let result = NikConfirmationRepo::delete_all(&mut conn)
            .await
            .map_err(SyncError::ClearFailed);
        Self::unlock(conn).await;

        if let Ok(deleted) = result {
            tracing::info!(deleted, "Cleared local NIK confirmations");
        }
        result
    }

    /// Freshness summary of the local mirror.
    pub async fn statistics(&self) -> Result<StoreStatistics, SyncError> {
        Ok(NikConfirmationRepo::statistics(&self.pool).await?)
    }

    // ---- private helpers ----

    /// Fetch, clear, and refill while holding the lock on `conn`.
    async fn replace(
        &self,
        conn: &mut PgConnection,
        creds: &SapCredentials,
        filter: &ListFilter,
    ) -> Result<SyncStatistics, SyncError> {
        let reply = self
            .gateway
            .list_confirmations_with_retry(creds, filter)
            .await
            .map_err(SyncError::RemoteFetchFailed)?;

        tracing::info!(
            record_count = reply.data.len(),
            "Fetched NIK confirmations from SAP"
        );

        if reply.data.is_empty() {
            tracing::info!("SAP returned no records, local data left unchanged");
            return Ok(SyncStatistics::default());
        }

        let deleted = NikConfirmationRepo::delete_all(&mut *conn)
            .await
            .map_err(SyncError::ClearFailed)?;
        tracing::info!(deleted, "Deleted existing NIK confirmations");

        let mut stats = insert_feed(conn, &reply.data).await;
        stats.deleted = deleted;
        Ok(stats)
    }

    /// Take the sync advisory lock on a dedicated connection.
    ///
    /// The connection is detached from the pool so the session-level lock
    /// dies with it even if the explicit unlock never runs.
    async fn lock(&self) -> Result<PgConnection, SyncError> {
        let mut conn = self.pool.acquire().await?.detach();
        let (locked,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
            .bind(SYNC_LOCK_ID)
            .fetch_one(&mut conn)
            .await?;

        if !locked {
            tracing::warn!("Sync lock is held by another run");
            return Err(SyncError::AlreadyRunning);
        }
        Ok(conn)
    }

    async fn unlock(mut conn: PgConnection) {
        if let Err(e) = sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(SYNC_LOCK_ID)
            .execute(&mut conn)
            .await
        {
            tracing::warn!(error = %e, "Failed to release sync lock");
        }
        if let Err(e) = conn.close().await {
            tracing::debug!(error = %e, "Closing sync connection failed");
        }
    }
}

/// Insert every record, counting outcomes. A failing row never stops the batch.
async fn insert_feed(conn: &mut PgConnection, records: &[SapRecord]) -> SyncStatistics {
    let mut stats = SyncStatistics::for_feed(records.len());
    let synced_at = Utc::now();

    for record in records {
        let normalized = match normalize_record(record.as_raw(), synced_at) {
            Ok(normalized) => normalized,
            Err(e) if e.is_skip() => {
                tracing::warn!(?record, reason = %e, "Skipping NIK confirmation");
                stats.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::error!(?record, error = %e, "Invalid NIK confirmation");
                stats.errors += 1;
                continue;
            }
        };

        let input = CreateNikConfirmation::from(normalized);
        match NikConfirmationRepo::create(&mut *conn, &input).await {
            Ok(()) => {
                stats.inserted += 1;
                tracing::debug!(pernr = %input.pernr, werks = %input.werks, "Inserted NIK confirmation");
            }
            Err(e) => {
                stats.errors += 1;
                tracing::error!(
                    pernr = %input.pernr,
                    werks = %input.werks,
                    error = %e,
                    "Failed to insert NIK confirmation",
                );
            }
        }
    }

    stats
}
