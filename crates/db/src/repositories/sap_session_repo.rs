//! Repository for the `sap_sessions` table.

use sqlx::PgPool;

use nik_core::types::DbId;

use crate::models::sap_session::{CreateSapSession, SapSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, session_token_hash, user_id, sap_username, sap_password_encrypted, \
                        user_display, logged_in_at, last_validated_at, expires_at, \
                        created_at, updated_at";

/// Provides CRUD operations for server-side sessions.
pub struct SapSessionRepo;

impl SapSessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSapSession,
    ) -> Result<SapSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO sap_sessions
                (session_token_hash, user_id, sap_username, sap_password_encrypted,
                 user_display, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SapSession>(&query)
            .bind(&input.session_token_hash)
            .bind(input.user_id)
            .bind(&input.sap_username)
            .bind(&input.sap_password_encrypted)
            .bind(&input.user_display)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an unexpired session by its token hash.
    pub async fn find_active_by_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<SapSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sap_sessions
             WHERE session_token_hash = $1
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, SapSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Stamp `last_validated_at` after a successful SAP liveness check.
    pub async fn touch_validated(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE sap_sessions SET last_validated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete the session with the given token hash. Returns `true` if a row existed.
    pub async fn delete_by_token_hash(pool: &PgPool, hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sap_sessions WHERE session_token_hash = $1")
            .bind(hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete expired sessions. Returns the count of deleted rows.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sap_sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
