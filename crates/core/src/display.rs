//! Listing rules for the NIK confirmation display endpoint.
//!
//! Sort fields, sort order, and data source are restricted to fixed
//! allow-lists; anything else is a validation error rather than a silent
//! fallback to the default.

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of rows per page.
pub const DEFAULT_PER_PAGE: i64 = 50;

/// Maximum number of rows per page.
pub const MAX_PER_PAGE: i64 = 500;

/// Clamp a user-provided page size to `1..=max`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided 1-based page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Escape `%`, `_` and `\` so user input is matched literally by `LIKE`.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ---------------------------------------------------------------------------
// Sort field
// ---------------------------------------------------------------------------

pub const SORT_PERNR: &str = "pernr";
pub const SORT_WERKS: &str = "werks";
pub const SORT_NAME1: &str = "name1";
pub const SORT_CREATED_ON: &str = "created_on";
pub const SORT_SYNCED_AT: &str = "synced_at";

/// All accepted `sort_by` values.
pub const VALID_SORT_FIELDS: &[&str] = &[
    SORT_PERNR,
    SORT_WERKS,
    SORT_NAME1,
    SORT_CREATED_ON,
    SORT_SYNCED_AT,
];

/// Column a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Pernr,
    Werks,
    Name1,
    CreatedOn,
    SyncedAt,
}

impl SortField {
    /// Return the column name. Safe to interpolate into SQL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pernr => SORT_PERNR,
            Self::Werks => SORT_WERKS,
            Self::Name1 => SORT_NAME1,
            Self::CreatedOn => SORT_CREATED_ON,
            Self::SyncedAt => SORT_SYNCED_AT,
        }
    }

    /// Parse from a string, returning an error for unknown fields.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            SORT_PERNR => Ok(Self::Pernr),
            SORT_WERKS => Ok(Self::Werks),
            SORT_NAME1 => Ok(Self::Name1),
            SORT_CREATED_ON => Ok(Self::CreatedOn),
            SORT_SYNCED_AT => Ok(Self::SyncedAt),
            other => Err(CoreError::Validation(format!(
                "Unknown sort field: '{other}'. Valid fields: {}",
                VALID_SORT_FIELDS.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Sort order
// ---------------------------------------------------------------------------

/// Direction of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Return the SQL keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parse `asc` / `desc`, returning an error for anything else.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(CoreError::Validation(format!(
                "Unknown sort order: '{other}'. Valid orders: asc, desc"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

pub const SOURCE_DATABASE: &str = "database";
pub const SOURCE_SAP: &str = "sap";
pub const SOURCE_BOTH: &str = "both";

/// Where the display endpoint reads its rows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    /// The local mirror only.
    #[default]
    Database,
    /// A live call to the SAP gateway, passed through.
    Sap,
    /// A live call to the SAP gateway, then the local mirror.
    Both,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => SOURCE_DATABASE,
            Self::Sap => SOURCE_SAP,
            Self::Both => SOURCE_BOTH,
        }
    }

    /// Parse from a string, returning an error for unknown sources.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            SOURCE_DATABASE => Ok(Self::Database),
            SOURCE_SAP => Ok(Self::Sap),
            SOURCE_BOTH => Ok(Self::Both),
            other => Err(CoreError::Validation(format!(
                "Unknown source: '{other}'. Valid sources: {SOURCE_DATABASE}, {SOURCE_SAP}, {SOURCE_BOTH}"
            ))),
        }
    }

    /// Whether the gateway has to be called for this source.
    pub fn reads_remote(&self) -> bool {
        matches!(self, Self::Sap | Self::Both)
    }
}

// ---------------------------------------------------------------------------
// Page metadata
// ---------------------------------------------------------------------------

/// Offset-based pagination block returned alongside a page of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub total: i64,
    pub per_page: i64,
    pub current_page: i64,
    pub last_page: i64,
    /// 1-based index of the first row on this page, `None` when empty.
    pub from: Option<i64>,
    /// 1-based index of the last row on this page, `None` when empty.
    pub to: Option<i64>,
}

impl PageInfo {
    pub fn new(total: i64, per_page: i64, current_page: i64, row_count: i64) -> Self {
        let last_page = ((total + per_page - 1) / per_page).max(1);
        let offset = (current_page - 1).max(0).saturating_mul(per_page);
        let (from, to) = if row_count > 0 {
            (
                Some(offset.saturating_add(1)),
                Some(offset.saturating_add(row_count)),
            )
        } else {
            (None, None)
        };
        Self {
            total,
            per_page,
            current_page,
            last_page,
            from,
            to,
        }
    }
}

/// Row offset of a 1-based page. A page whose offset does not fit in an
/// `i64` is a validation error.
pub fn offset_for(page: i64, per_page: i64) -> Result<i64, CoreError> {
    (page - 1)
        .max(0)
        .checked_mul(per_page)
        .ok_or_else(|| CoreError::Validation("The page field is too large.".to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn sort_field_round_trips_through_allow_list() {
        for name in VALID_SORT_FIELDS {
            assert_eq!(SortField::from_str(name).unwrap().as_str(), *name);
        }
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let err = SortField::from_str("password_hash").unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("password_hash"));
    }

    #[test]
    fn sort_order_is_case_sensitive() {
        assert_eq!(SortOrder::from_str("desc").unwrap(), SortOrder::Desc);
        assert!(SortOrder::from_str("DESC; DROP TABLE").is_err());
    }

    #[test]
    fn data_source_parsing() {
        assert_eq!(DataSource::from_str("both").unwrap(), DataSource::Both);
        assert!(DataSource::Both.reads_remote());
        assert!(!DataSource::Database.reads_remote());
        assert!(DataSource::from_str("cache").is_err());
    }

    #[test]
    fn clamp_limit_caps_page_size() {
        assert_eq!(clamp_limit(None, DEFAULT_PER_PAGE, MAX_PER_PAGE), 50);
        assert_eq!(clamp_limit(Some(10_000), DEFAULT_PER_PAGE, MAX_PER_PAGE), 500);
        assert_eq!(clamp_limit(Some(0), DEFAULT_PER_PAGE, MAX_PER_PAGE), 1);
    }

    #[test]
    fn clamp_page_floors_at_one() {
        assert_eq!(clamp_page(None), 1);
        assert_eq!(clamp_page(Some(-3)), 1);
        assert_eq!(clamp_page(Some(4)), 4);
    }

    #[test]
    fn escape_like_quotes_wildcards() {
        assert_eq!(escape_like("10%_"), "10\\%\\_");
        assert_eq!(escape_like("P100"), "P100");
    }

    #[test]
    fn page_info_for_partial_last_page() {
        let info = PageInfo::new(120, 50, 3, 20);
        assert_eq!(info.last_page, 3);
        assert_eq!(info.from, Some(101));
        assert_eq!(info.to, Some(120));
    }

    #[test]
    fn offset_of_huge_page_is_rejected() {
        assert_eq!(offset_for(3, 50).unwrap(), 100);
        assert_eq!(offset_for(clamp_page(Some(-1)), 50).unwrap(), 0);

        let err = offset_for(clamp_page(Some(i64::MAX)), MAX_PER_PAGE).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("page"));
    }

    #[test]
    fn page_info_saturates_for_huge_page() {
        let info = PageInfo::new(1, 50, i64::MAX, 1);
        assert_eq!(info.to, Some(i64::MAX));
    }

    #[test]
    fn page_info_for_empty_result() {
        let info = PageInfo::new(0, 50, 1, 0);
        assert_eq!(info.last_page, 1);
        assert_eq!(info.from, None);
        assert_eq!(info.to, None);
    }
}
