//! NIK confirmation field rules.
//!
//! SAP keeps personnel numbers as 8-digit zero-padded strings (`PERNR`) and
//! plant codes as 4-character space-padded strings (`WERKS`). The local
//! mirror stores the exact SAP representation so that keys compare equal
//! across both systems.

use chrono::NaiveDate;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Field widths
// ---------------------------------------------------------------------------

/// Width of a normalized personnel number.
pub const PERNR_WIDTH: usize = 8;

/// Width of a normalized plant code.
pub const WERKS_WIDTH: usize = 4;

/// SAP's "no date" sentinel for `DATS` fields.
pub const SAP_NULL_DATE: &str = "00000000";

/// Display format for calendar dates (`15.01.2024`).
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Display format for sync timestamps (`15.01.2024 08:30:00`).
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Zero-pad a personnel number on the left to [`PERNR_WIDTH`] characters.
///
/// Surrounding whitespace is removed first. Values already at (or beyond)
/// the target width are returned unchanged, so the function is idempotent.
pub fn normalize_pernr(pernr: &str) -> String {
    format!("{:0>width$}", pernr.trim(), width = PERNR_WIDTH)
}

/// Space-pad a plant code on the right to [`WERKS_WIDTH`] characters.
pub fn normalize_werks(werks: &str) -> String {
    format!("{:<width$}", werks.trim(), width = WERKS_WIDTH)
}

/// Personnel number without leading zeros, as shown in listings.
pub fn pernr_display(pernr: &str) -> &str {
    pernr.trim_start_matches('0')
}

/// Parse a date as delivered by the SAP gateway.
///
/// Accepts the native `YYYYMMDD` form and the already-ISO `YYYY-MM-DD`
/// form. Empty input, the `00000000` sentinel, and anything unparsable
/// all yield `None`.
pub fn parse_sap_date(raw: Option<&str>) -> Option<NaiveDate> {
    let value = raw?.trim();
    if value.is_empty() || value == SAP_NULL_DATE {
        return None;
    }

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    match value.len() {
        10 if value.as_bytes()[4] == b'-'
            && value.as_bytes()[7] == b'-'
            && all_digits(&value[..4])
            && all_digits(&value[5..7])
            && all_digits(&value[8..]) =>
        {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
        }
        8 if all_digits(value) => NaiveDate::parse_from_str(value, "%Y%m%d").ok(),
        _ => None,
    }
}

/// Format an optional calendar date for display.
pub fn format_display_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
}

/// Format an optional sync timestamp for display.
pub fn format_display_timestamp(ts: Option<Timestamp>) -> Option<String> {
    ts.map(|t| t.format(DISPLAY_TIMESTAMP_FORMAT).to_string())
}

// ---------------------------------------------------------------------------
// Record conversion
// ---------------------------------------------------------------------------

/// A record as fetched from SAP, before any normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawRecord<'a> {
    pub pernr: Option<&'a str>,
    pub werks: Option<&'a str>,
    pub name1: Option<&'a str>,
    pub created_by: Option<&'a str>,
    pub created_on: Option<&'a str>,
}

/// A record ready to be inserted into the local mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub pernr: String,
    pub werks: String,
    pub name1: String,
    pub created_by: String,
    pub created_on: Option<NaiveDate>,
    pub synced_at: Timestamp,
}

/// Why a single fetched record could not be turned into a row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// A key field is absent or blank. Counted as skipped, not as an error.
    #[error("Missing required field {0}")]
    MissingField(&'static str),

    #[error("Invalid personnel number '{0}'")]
    InvalidPernr(String),

    #[error("Invalid plant code '{0}'")]
    InvalidWerks(String),
}

impl RowError {
    /// Whether the record should be counted as skipped rather than failed.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::MissingField(_))
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, RowError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RowError::MissingField(field)),
    }
}

/// Normalize a fetched record, stamping it with the sync run's timestamp.
pub fn normalize_record(
    raw: RawRecord<'_>,
    synced_at: Timestamp,
) -> Result<NormalizedRecord, RowError> {
    let pernr = required(raw.pernr, "PERNR")?;
    let werks = required(raw.werks, "WERKS")?;

    if pernr.len() > PERNR_WIDTH || !pernr.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RowError::InvalidPernr(pernr.to_string()));
    }
    if werks.chars().count() > WERKS_WIDTH {
        return Err(RowError::InvalidWerks(werks.to_string()));
    }

    Ok(NormalizedRecord {
        pernr: normalize_pernr(pernr),
        werks: normalize_werks(werks),
        name1: raw.name1.unwrap_or_default().trim().to_string(),
        created_by: raw.created_by.unwrap_or_default().trim().to_string(),
        created_on: parse_sap_date(raw.created_on),
        synced_at,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
