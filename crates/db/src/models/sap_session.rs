//! Server-side session model and DTOs.

use sqlx::FromRow;

use nik_core::types::{DbId, Timestamp};

/// A row from the `sap_sessions` table.
///
/// `sap_password_encrypted` is sealed with the application cipher and must
/// only be opened inside the request that needs it.
#[derive(Debug, Clone, FromRow)]
pub struct SapSession {
    pub id: DbId,
    pub session_token_hash: String,
    pub user_id: DbId,
    pub sap_username: String,
    pub sap_password_encrypted: String,
    pub user_display: Option<String>,
    pub logged_in_at: Timestamp,
    pub last_validated_at: Option<Timestamp>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SapSession {
    /// Whether a remote credential is actually stored on this session.
    pub fn has_sap_credentials(&self) -> bool {
        !self.sap_username.is_empty() && !self.sap_password_encrypted.is_empty()
    }
}

/// DTO for creating a session at login.
pub struct CreateSapSession {
    pub session_token_hash: String,
    pub user_id: DbId,
    pub sap_username: String,
    pub sap_password_encrypted: String,
    pub user_display: Option<String>,
    pub expires_at: Timestamp,
}
