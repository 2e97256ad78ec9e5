//! HTTP client for the SAP gateway.
//!
//! The gateway exposes two services: a config API used for credential
//! checks and writes, and a confirmation API used for listing. Both are
//! thin JSON wrappers around SAP RFC calls.

pub mod api;
pub mod messages;
pub mod retry;

pub use api::{ListFilter, SapApiError, SapCredentials, SapEndpoints, SapGateway};
pub use retry::RetryPolicy;
