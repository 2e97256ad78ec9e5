use std::time::Duration;

use nik_sap::{RetryPolicy, SapCredentials, SapEndpoints};

/// Server configuration loaded from environment variables.
///
/// All fields except `APP_KEY` have defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for in-flight requests after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Browser session settings.
    pub session: SessionConfig,
    /// SAP gateway settings.
    pub sap: SapConfig,
}

/// Browser session settings.
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret from which the credential encryption key is derived.
    pub app_key: String,
    /// Session lifetime in minutes (default: `120`).
    pub lifetime_mins: i64,
    /// Whether the session cookie carries the `Secure` attribute (default: `false`).
    pub secure_cookie: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("app_key", &"<redacted>")
            .field("lifetime_mins", &self.lifetime_mins)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

/// SAP gateway settings.
#[derive(Clone)]
pub struct SapConfig {
    /// Config API base URL (credential checks, insert, delete).
    pub config_api_url: String,
    /// Confirmation API base URL (display, health).
    pub confirmation_api_url: String,
    pub timeout_secs: u64,
    /// Total attempts for the sync fetch.
    pub retry_times: u32,
    pub retry_sleep_ms: u64,
    /// Service account for background sync. Absent when unset or empty.
    pub sync_username: Option<String>,
    pub sync_password: Option<String>,
}

impl std::fmt::Debug for SapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SapConfig")
            .field("config_api_url", &self.config_api_url)
            .field("confirmation_api_url", &self.confirmation_api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry_times", &self.retry_times)
            .field("retry_sleep_ms", &self.retry_sleep_ms)
            .field("sync_username", &self.sync_username)
            .finish_non_exhaustive()
    }
}

impl SapConfig {
    pub fn endpoints(&self) -> SapEndpoints {
        SapEndpoints::new(&self.config_api_url, &self.confirmation_api_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_times,
            delay: Duration::from_millis(self.retry_sleep_ms),
        }
    }

    /// The sync service account, if both halves are configured.
    pub fn sync_credentials(&self) -> Option<SapCredentials> {
        match (&self.sync_username, &self.sync_password) {
            (Some(user), Some(pass)) => Some(SapCredentials::new(user, pass)),
            _ => None,
        }
    }

    /// Load the `SAP_*` variables. Shared with the operator CLI.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `SAP_NIK_API_URL`      | `http://127.0.0.1:5042`  |
    /// | `SAP_NIK_CONF_API_URL` | `http://127.0.0.1:5040`  |
    /// | `SAP_TIMEOUT_SECS`     | `30`                     |
    /// | `SAP_RETRY_TIMES`      | `3`                      |
    /// | `SAP_RETRY_SLEEP_MS`   | `1000`                   |
    /// | `SAP_SYNC_USERNAME`    | unset                    |
    /// | `SAP_SYNC_PASSWORD`    | unset                    |
    pub fn from_env() -> Self {
        Self {
            config_api_url: env_or("SAP_NIK_API_URL", "http://127.0.0.1:5042"),
            confirmation_api_url: env_or("SAP_NIK_CONF_API_URL", "http://127.0.0.1:5040"),
            timeout_secs: env_or("SAP_TIMEOUT_SECS", "30")
                .parse()
                .expect("SAP_TIMEOUT_SECS must be a valid u64"),
            retry_times: env_or("SAP_RETRY_TIMES", "3")
                .parse()
                .expect("SAP_RETRY_TIMES must be a valid u32"),
            retry_sleep_ms: env_or("SAP_RETRY_SLEEP_MS", "1000")
                .parse()
                .expect("SAP_RETRY_SLEEP_MS must be a valid u64"),
            sync_username: env_non_empty("SAP_SYNC_USERNAME"),
            sync_password: env_non_empty("SAP_SYNC_PASSWORD"),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `HOST`                  | `0.0.0.0`                |
    /// | `PORT`                  | `3000`                   |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                     |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                     |
    /// | `APP_KEY`               | required                 |
    /// | `SESSION_LIFETIME_MINS` | `120`                    |
    /// | `SESSION_SECURE_COOKIE` | `false`                  |
    ///
    /// plus the `SAP_*` variables listed on [`SapConfig::from_env`].
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", "30")
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let session = SessionConfig {
            app_key: env_non_empty("APP_KEY").expect("APP_KEY must be set"),
            lifetime_mins: env_or("SESSION_LIFETIME_MINS", "120")
                .parse()
                .expect("SESSION_LIFETIME_MINS must be a valid i64"),
            secure_cookie: env_or("SESSION_SECURE_COOKIE", "false")
                .parse()
                .expect("SESSION_SECURE_COOKIE must be true or false"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            session,
            sap: SapConfig::from_env(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
