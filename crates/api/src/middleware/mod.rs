//! Authentication extractors.
//!
//! - [`dual_auth::DualAuthSession`] -- requires a dual-authenticated session (JSON 401 otherwise).
//! - [`dual_auth::DualAuthPage`] -- same check for pages, redirecting to `/login`.

pub mod dual_auth;
