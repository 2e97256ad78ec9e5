use nik_sap::SapApiError;

/// Fatal outcomes of a sync run. Per-row failures are counted, not raised.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("SAP sync credentials are not configured (set SAP_SYNC_USERNAME and SAP_SYNC_PASSWORD)")]
    MisconfiguredCredentials,

    #[error("Failed to fetch data from SAP: {}", .0.user_message())]
    RemoteFetchFailed(#[source] SapApiError),

    #[error("Failed to clear existing data: {0}")]
    ClearFailed(#[source] sqlx::Error),

    #[error("Another sync is already running")]
    AlreadyRunning,

    #[error("Sync task stopped unexpectedly: {0}")]
    Interrupted(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
