//! Wire types exchanged with the SAP gateway.
//!
//! Field names on the read side follow SAP's upper-case column names.

use serde::{Deserialize, Deserializer, Serialize};

use nik_core::nik::RawRecord;

/// Value of `delete_flag` that turns a write into a deletion.
pub const DELETE_FLAG: &str = "X";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /api/nik-conf/display`.
#[derive(Debug, Serialize)]
pub struct ListRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pernr: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub werks: Option<&'a str>,
}

/// Body of `POST /api/nik-conf/insert` and `POST /api/nik-conf/delete`.
#[derive(Debug, Serialize)]
pub struct WriteRequest<'a> {
    pub pernr: &'a str,
    pub werks: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_flag: Option<&'static str>,
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// One row of the display feed.
///
/// Every field is optional: SAP may omit or blank any of them, and the
/// sync job decides what to do with incomplete rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SapRecord {
    #[serde(rename = "PERNR", default, deserialize_with = "lenient_string")]
    pub pernr: Option<String>,
    #[serde(rename = "WERKS", default, deserialize_with = "lenient_string")]
    pub werks: Option<String>,
    #[serde(rename = "NAME1", default, deserialize_with = "lenient_string")]
    pub name1: Option<String>,
    #[serde(rename = "CREATED_BY", default, deserialize_with = "lenient_string")]
    pub created_by: Option<String>,
    #[serde(rename = "CREATED_ON", default, deserialize_with = "lenient_string")]
    pub created_on: Option<String>,
}

impl SapRecord {
    /// Borrow the record as input for normalization.
    pub fn as_raw(&self) -> RawRecord<'_> {
        RawRecord {
            pernr: self.pernr.as_deref(),
            werks: self.werks.as_deref(),
            name1: self.name1.as_deref(),
            created_by: self.created_by.as_deref(),
            created_on: self.created_on.as_deref(),
        }
    }
}

/// Reply of `POST /api/nik-conf/display`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Vec<SapRecord>,
    #[serde(default)]
    pub record_count: Option<u64>,
}

impl ListReply {
    /// Number of records, preferring the gateway's own count.
    pub fn record_count(&self) -> u64 {
        self.record_count.unwrap_or(self.data.len() as u64)
    }

    /// Human-readable reason for an unsuccessful reply.
    pub fn failure_text(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "Failed to fetch from SAP".to_string())
    }
}

/// Reply of the write endpoints, passed back to the caller as-is.
///
/// Unknown fields are kept in `extra` so nothing the gateway says is lost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GatewayReply {
    /// Failure reply for a body the gateway did not send as JSON.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn failure_text(&self) -> &str {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("Unknown error")
    }
}

/// Pull `error` (or `message`) out of a JSON error body.
pub fn error_text(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
        message: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.error.or(parsed.message)
}

/// Accept a string, a number, or null for a textual SAP field.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
