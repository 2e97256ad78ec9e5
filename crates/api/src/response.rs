//! Shared response types for API handlers.
//!
//! Successful responses carry `"success": true` plus a message and the
//! payload, mirroring the `{ "success": false, ... }` error envelope built
//! by [`AppError`](crate::error::AppError).

use nik_core::display::PageInfo;
use nik_core::nik::{format_display_date, format_display_timestamp, pernr_display};
use nik_core::sync::{StoreStatistics, SyncStatistics};
use nik_core::types::{DbId, Timestamp};
use nik_db::models::nik_confirmation::NikConfirmation;
use nik_db::models::user::{User, UserResponse};
use serde::Serialize;

use crate::query::AppliedFilters;

/// `{ "success": true, "message": ... }`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub authenticated: bool,
    pub user: UserResponse,
}

/// Account details including admin flag and the last dual login.
#[derive(Debug, Serialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: UserResponse,
    pub is_admin: bool,
    pub last_sap_login: Option<Timestamp>,
}

impl From<&User> for UserDetails {
    fn from(user: &User) -> Self {
        Self {
            user: UserResponse::from(user),
            is_admin: user.is_admin(),
            last_sap_login: user.last_sap_login_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub success: bool,
    pub user: UserDetails,
}

#[derive(Debug, Serialize)]
pub struct ValidateSapResponse {
    pub success: bool,
    pub valid: bool,
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// NIK confirmations
// ---------------------------------------------------------------------------

/// One listing row, formatted for display.
#[derive(Debug, Serialize)]
pub struct NikRow {
    pub id: DbId,
    pub pernr: String,
    pub pernr_display: String,
    pub werks: String,
    pub name1: Option<String>,
    pub created_by: Option<String>,
    /// `dd.mm.yyyy`
    pub created_on: Option<String>,
    /// `dd.mm.yyyy HH:MM:SS`
    pub synced_at: Option<String>,
}

impl From<NikConfirmation> for NikRow {
    fn from(row: NikConfirmation) -> Self {
        Self {
            id: row.id,
            pernr_display: pernr_display(&row.pernr).to_string(),
            werks: row.werks.trim().to_string(),
            pernr: row.pernr,
            name1: row.name1,
            created_by: row.created_by,
            created_on: format_display_date(row.created_on),
            synced_at: format_display_timestamp(row.synced_at),
        }
    }
}

/// Outcome of the live SAP call made for `source=both`.
#[derive(Debug, Serialize)]
pub struct RemoteSummary {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub record_count: u64,
}

#[derive(Debug, Serialize)]
pub struct DisplayResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: Vec<NikRow>,
    pub pagination: PageInfo,
    pub filters_applied: AppliedFilters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteSummary>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: &'static str,
    pub statistics: SyncStatistics,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub success: bool,
    pub statistics: StoreStatistics,
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: serde_json::Value,
}

/// Live SAP listing returned for `source=sap`.
#[derive(Debug, Serialize)]
pub struct SapDisplayResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<nik_sap::messages::SapRecord>,
    pub record_count: u64,
    pub source: &'static str,
}
