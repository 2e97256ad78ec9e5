//! Shared query and body parameter types for API handlers.
//!
//! Fields are optional strings so missing or malformed values can be
//! answered with the standard error envelope instead of a bare rejection.

use nik_core::display::{
    clamp_limit, clamp_page, offset_for, DataSource, SortField, SortOrder, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
use nik_core::error::CoreError;
use serde::{Deserialize, Serialize};

/// Query parameters of `GET /api/nik/display`.
#[derive(Debug, Default, Deserialize)]
pub struct DisplayParams {
    pub pernr: Option<String>,
    pub werks: Option<String>,
    pub search: Option<String>,
    pub per_page: Option<String>,
    pub page: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub source: Option<String>,
}

/// [`DisplayParams`] after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayQuery {
    pub filters: AppliedFilters,
    pub per_page: i64,
    pub page: i64,
    /// Row offset of `page`, checked against overflow.
    pub offset: i64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub source: DataSource,
}

/// Filters echoed back as `filters_applied`. Blank values are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppliedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pernr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub werks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl DisplayParams {
    /// Validate sort/source against their allow-lists and clamp paging.
    pub fn validate(self) -> Result<DisplayQuery, CoreError> {
        let sort_by = match non_blank(self.sort_by) {
            Some(s) => SortField::from_str(&s)?,
            None => SortField::default(),
        };
        let sort_order = match non_blank(self.sort_order) {
            Some(s) => SortOrder::from_str(&s)?,
            None => SortOrder::default(),
        };
        let source = match non_blank(self.source) {
            Some(s) => DataSource::from_str(&s)?,
            None => DataSource::default(),
        };

        let per_page = clamp_limit(
            parse_int("per_page", self.per_page)?,
            DEFAULT_PER_PAGE,
            MAX_PER_PAGE,
        );
        let page = clamp_page(parse_int("page", self.page)?);
        let offset = offset_for(page, per_page)?;

        Ok(DisplayQuery {
            filters: AppliedFilters {
                pernr: non_blank(self.pernr),
                werks: non_blank(self.werks),
                search: non_blank(self.search),
            },
            per_page,
            page,
            offset,
            sort_by,
            sort_order,
            source,
        })
    }
}

/// Body of `POST /api/nik/sync`.
#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    pub pernr: Option<String>,
    pub werks: Option<String>,
}

/// Body of `POST /api/nik/insert` and `POST /api/nik/delete`.
#[derive(Debug, Default, Deserialize)]
pub struct NikKeyRequest {
    pub pernr: Option<String>,
    pub werks: Option<String>,
}

impl NikKeyRequest {
    /// Both keys, trimmed. Blank or missing values are a validation error.
    pub fn validate(self) -> Result<(String, String), CoreError> {
        let pernr = non_blank(self.pernr);
        let werks = non_blank(self.werks);
        match (pernr, werks) {
            (Some(pernr), Some(werks)) => Ok((pernr, werks)),
            (None, _) => Err(CoreError::Validation("The pernr field is required.".into())),
            (_, None) => Err(CoreError::Validation("The werks field is required.".into())),
        }
    }
}

/// Trimmed value, `None` when absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_int(field: &str, value: Option<String>) -> Result<Option<i64>, CoreError> {
    non_blank(value)
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| CoreError::Validation(format!("The {field} field must be an integer.")))
        })
        .transpose()
}
