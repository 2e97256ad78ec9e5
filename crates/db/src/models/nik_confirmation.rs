//! NIK confirmation row model and DTOs.

use chrono::NaiveDate;
use sqlx::FromRow;

use nik_core::nik::NormalizedRecord;
use nik_core::types::{DbId, Timestamp};

/// A row from the `nik_confirmations` table.
///
/// `pernr` and `werks` hold the padded SAP representation.
#[derive(Debug, Clone, FromRow)]
pub struct NikConfirmation {
    pub id: DbId,
    pub pernr: String,
    pub werks: String,
    pub name1: Option<String>,
    pub created_by: Option<String>,
    pub created_on: Option<NaiveDate>,
    pub synced_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a confirmation produced by a sync run.
#[derive(Debug, Clone)]
pub struct CreateNikConfirmation {
    pub pernr: String,
    pub werks: String,
    pub name1: String,
    pub created_by: String,
    pub created_on: Option<NaiveDate>,
    pub synced_at: Timestamp,
}

impl From<NormalizedRecord> for CreateNikConfirmation {
    fn from(record: NormalizedRecord) -> Self {
        Self {
            pernr: record.pernr,
            werks: record.werks,
            name1: record.name1,
            created_by: record.created_by,
            created_on: record.created_on,
            synced_at: record.synced_at,
        }
    }
}

/// Filters for listing the local mirror. Empty strings are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct NikConfirmationFilter {
    /// Exact match after zero-padding.
    pub pernr: Option<String>,
    /// Prefix match on the trimmed value.
    pub werks: Option<String>,
    /// Case-insensitive substring match on `name1`.
    pub search: Option<String>,
}
