use std::sync::Arc;

use nik_core::crypto::CredentialCipher;
use nik_sap::SapGateway;
use nik_sync::SyncJob;

use crate::config::ServerConfig;
use crate::error::AppError;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: nik_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// SAP gateway client shared by all requests.
    pub gateway: SapGateway,
    /// Seals SAP passwords stored in sessions.
    pub cipher: CredentialCipher,
    /// Full-replace sync job bound to the service account.
    pub sync_job: SyncJob,
}

impl AppState {
    /// Wire up state from a pool and a loaded configuration.
    pub fn new(pool: nik_db::DbPool, config: ServerConfig) -> Result<Self, AppError> {
        let cipher = CredentialCipher::from_secret(&config.session.app_key)?;
        let gateway = SapGateway::new(
            config.sap.endpoints(),
            config.sap.timeout(),
            config.sap.retry_policy(),
        )?;
        let sync_job = SyncJob::new(pool.clone(), gateway.clone(), config.sap.sync_credentials());

        Ok(Self {
            pool,
            config: Arc::new(config),
            gateway,
            cipher,
            sync_job,
        })
    }
}
