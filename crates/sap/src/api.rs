//! REST client for the SAP gateway endpoints.
//!
//! Wraps credential checks, confirmation listing, and writes using
//! [`reqwest`]. Credentials travel as `X-SAP-Username` / `X-SAP-Password`
//! headers on every call.

use std::time::Duration;

use crate::messages::{
    error_text, GatewayReply, ListReply, ListRequest, WriteRequest, DELETE_FLAG,
};
use crate::retry::{with_retry, RetryPolicy};

const HEADER_USERNAME: &str = "X-SAP-Username";
const HEADER_PASSWORD: &str = "X-SAP-Password";

/// Base URLs of the two gateway services.
#[derive(Debug, Clone)]
pub struct SapEndpoints {
    /// Credential checks and writes (`/api/sap-login`, `/api/nik-conf/insert|delete`).
    pub config_api: String,
    /// Listing and liveness (`/api/nik-conf/display`, `/health`).
    pub confirmation_api: String,
}

impl SapEndpoints {
    pub fn new(config_api: impl Into<String>, confirmation_api: impl Into<String>) -> Self {
        Self {
            config_api: config_api.into().trim_end_matches('/').to_string(),
            confirmation_api: confirmation_api.into().trim_end_matches('/').to_string(),
        }
    }
}

/// A SAP username/password pair.
///
/// The password is redacted from `Debug` output.
#[derive(Clone)]
pub struct SapCredentials {
    pub username: String,
    password: String,
}

impl SapCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for SapCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SapCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Optional filters for a confirmation listing. Blank values are dropped.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub pernr: Option<String>,
    pub werks: Option<String>,
}

impl ListFilter {
    pub fn new(pernr: Option<&str>, werks: Option<&str>) -> Self {
        let keep = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            pernr: keep(pernr),
            werks: keep(werks),
        }
    }
}

/// Errors from the SAP gateway layer.
#[derive(Debug, thiserror::Error)]
pub enum SapApiError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("SAP gateway error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The gateway answered but refused the request.
    #[error("{0}")]
    Rejected(String),
}

impl SapApiError {
    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => !e.is_decode() && !e.is_builder(),
            Self::ApiError { status, .. } => *status >= 500,
            Self::Rejected(_) => false,
        }
    }

    /// Text suitable for showing to the user who triggered the call.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(e) if e.is_timeout() => "SAP gateway timed out".to_string(),
            Self::Request(_) => "SAP gateway unreachable".to_string(),
            Self::ApiError { status, body } => {
                error_text(body).unwrap_or_else(|| format!("SAP gateway returned HTTP {status}"))
            }
            Self::Rejected(msg) => msg.clone(),
        }
    }
}

/// HTTP client for the SAP gateway.
#[derive(Debug, Clone)]
pub struct SapGateway {
    client: reqwest::Client,
    endpoints: SapEndpoints,
    retry: RetryPolicy,
}

impl SapGateway {
    /// Create a client whose requests time out after `timeout`.
    pub fn new(
        endpoints: SapEndpoints,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, SapApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoints, retry))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, endpoints: SapEndpoints, retry: RetryPolicy) -> Self {
        Self {
            client,
            endpoints,
            retry,
        }
    }

    pub fn endpoints(&self) -> &SapEndpoints {
        &self.endpoints
    }

    /// Verify a username/password pair against SAP.
    ///
    /// Sends `POST /api/sap-login` to the config API. A non-2xx reply, or a
    /// 2xx reply with `"success": false`, is a [`SapApiError::Rejected`]
    /// carrying the gateway's `error` text.
    pub async fn check_credentials(
        &self,
        creds: &SapCredentials,
    ) -> Result<serde_json::Value, SapApiError> {
        let response = self
            .client
            .post(format!("{}/api/sap-login", self.endpoints.config_api))
            .header(HEADER_USERNAME, &creds.username)
            .header(HEADER_PASSWORD, creds.password())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let rejected = || {
            SapApiError::Rejected(
                error_text(&body).unwrap_or_else(|| "SAP connection failed".to_string()),
            )
        };
        if !status.is_success() {
            return Err(rejected());
        }

        let reply: serde_json::Value =
            serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        if reply.get("success").and_then(serde_json::Value::as_bool) == Some(false) {
            return Err(rejected());
        }
        Ok(reply)
    }

    /// List confirmations from the confirmation API, single attempt.
    ///
    /// Credentials are sent both in the body and as headers.
    pub async fn list_confirmations(
        &self,
        creds: &SapCredentials,
        filter: &ListFilter,
    ) -> Result<ListReply, SapApiError> {
        let body = ListRequest {
            username: &creds.username,
            password: creds.password(),
            pernr: filter.pernr.as_deref(),
            werks: filter.werks.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/api/nik-conf/display", self.endpoints.confirmation_api))
            .header(HEADER_USERNAME, &creds.username)
            .header(HEADER_PASSWORD, creds.password())
            .json(&body)
            .send()
            .await?;

        let reply: ListReply = Self::parse_response(response).await?;
        if !reply.success {
            return Err(SapApiError::Rejected(reply.failure_text()));
        }
        Ok(reply)
    }

    /// [`list_confirmations`](Self::list_confirmations) under the configured
    /// retry policy. Transport failures and 5xx replies are retried.
    pub async fn list_confirmations_with_retry(
        &self,
        creds: &SapCredentials,
        filter: &ListFilter,
    ) -> Result<ListReply, SapApiError> {
        with_retry(
            &self.retry,
            "nik-conf/display",
            SapApiError::is_transient,
            || self.list_confirmations(creds, filter),
        )
        .await
    }

    /// Create a NIK confirmation in SAP.
    pub async fn insert(
        &self,
        creds: &SapCredentials,
        pernr: &str,
        werks: &str,
    ) -> Result<GatewayReply, SapApiError> {
        let body = WriteRequest {
            pernr,
            werks,
            delete_flag: None,
        };
        self.write("insert", creds, &body).await
    }

    /// Remove a NIK confirmation in SAP.
    pub async fn delete(
        &self,
        creds: &SapCredentials,
        pernr: &str,
        werks: &str,
    ) -> Result<GatewayReply, SapApiError> {
        let body = WriteRequest {
            pernr,
            werks,
            delete_flag: Some(DELETE_FLAG),
        };
        self.write("delete", creds, &body).await
    }

    /// Call `GET /health` on the confirmation API.
    pub async fn health(&self, creds: &SapCredentials) -> Result<serde_json::Value, SapApiError> {
        let response = self
            .client
            .get(format!("{}/health", self.endpoints.confirmation_api))
            .header(HEADER_USERNAME, &creds.username)
            .header(HEADER_PASSWORD, creds.password())
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
    }

    // ---- private helpers ----

    /// Post a write and return the gateway's reply whatever its status.
    ///
    /// `success` is forced to `false` on a non-2xx status. A body that is
    /// not JSON becomes a synthetic failure reply.
    async fn write(
        &self,
        action: &str,
        creds: &SapCredentials,
        body: &WriteRequest<'_>,
    ) -> Result<GatewayReply, SapApiError> {
        let response = self
            .client
            .post(format!("{}/api/nik-conf/{action}", self.endpoints.config_api))
            .header(HEADER_USERNAME, &creds.username)
            .header(HEADER_PASSWORD, creds.password())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let mut reply = match serde_json::from_str::<GatewayReply>(&text) {
            Ok(reply) => reply,
            Err(_) if status.is_success() => {
                GatewayReply::failed("SAP gateway returned an unreadable reply")
            }
            Err(_) => {
                return Err(SapApiError::ApiError {
                    status: status.as_u16(),
                    body: text,
                })
            }
        };
        if !status.is_success() {
            reply.success = false;
        }
        Ok(reply)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`SapApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SapApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SapApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SapApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_drop_trailing_slash() {
        let endpoints = SapEndpoints::new("http://sap:5042/", "http://sap:5040");
        assert_eq!(endpoints.config_api, "http://sap:5042");
        assert_eq!(endpoints.confirmation_api, "http://sap:5040");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = SapCredentials::new("JDOE", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("JDOE"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn list_filter_drops_blanks() {
        let filter = ListFilter::new(Some("  "), Some(" AB "));
        assert_eq!(filter.pernr, None);
        assert_eq!(filter.werks.as_deref(), Some("AB"));
    }

    #[test]
    fn server_errors_are_transient() {
        let err = SapApiError::ApiError {
            status: 503,
            body: String::new(),
        };
        assert!(err.is_transient());

        let err = SapApiError::ApiError {
            status: 401,
            body: r#"{"error":"Logon failed"}"#.to_string(),
        };
        assert!(!err.is_transient());
        assert_eq!(err.user_message(), "Logon failed");

        assert!(!SapApiError::Rejected("no".into()).is_transient());
    }
}
