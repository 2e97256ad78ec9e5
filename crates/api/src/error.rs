use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nik_core::error::CoreError;
use nik_sap::SapApiError;
use nik_sync::SyncError;
use serde_json::json;

use crate::auth::AuthError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the error of every layer below the API and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce the
/// `{ "success": false, "error": ..., "code": ... }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `nik_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Login or session failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A fatal sync outcome.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A SAP gateway call failed outside of the sync job.
    #[error(transparent)]
    Gateway(#[from] SapApiError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Authentication ---
            AppError::Auth(err) => {
                let code = match err {
                    AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
                    AuthError::RemoteAuthFailed(_) => "SAP_AUTH_FAILED",
                    AuthError::NotAuthenticated => "UNAUTHENTICATED",
                };
                (StatusCode::UNAUTHORIZED, code, err.to_string())
            }

            // --- Sync job ---
            AppError::Sync(err) => classify_sync_error(err),

            // --- SAP gateway ---
            AppError::Gateway(err) => {
                tracing::warn!(error = %err, "SAP gateway call failed");
                (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR", err.user_message())
            }

            // --- HTTP-specific errors ---
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "success": false,
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a fatal sync outcome.
///
/// Fetch failures carry the gateway's user-facing text. Store failures are
/// logged and replaced with a generic message.
fn classify_sync_error(err: &SyncError) -> (StatusCode, &'static str, String) {
    match err {
        SyncError::MisconfiguredCredentials => {
            tracing::error!(error = %err, "Sync misconfigured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "MISCONFIGURED_CREDENTIALS",
                "SAP sync credentials are not configured".to_string(),
            )
        }
        SyncError::RemoteFetchFailed(_) => {
            (StatusCode::BAD_GATEWAY, "REMOTE_FETCH_FAILED", err.to_string())
        }
        SyncError::ClearFailed(e) => {
            tracing::error!(error = %e, "Clearing local data failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CLEAR_FAILED",
                "Failed to clear existing data".to_string(),
            )
        }
        SyncError::AlreadyRunning => (
            StatusCode::CONFLICT,
            "SYNC_ALREADY_RUNNING",
            err.to_string(),
        ),
        SyncError::Interrupted(msg) => {
            tracing::error!(error = %msg, "Sync task interrupted");
            internal()
        }
        SyncError::Database(e) => classify_sqlx_error(e),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
