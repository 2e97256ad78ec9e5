//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`session`] -- opaque session tokens and the session cookie.
//! - [`dual`] -- the local-then-SAP login flow and session lifecycle.

pub mod dual;
pub mod password;
pub mod session;

/// Why a caller is not (or no longer) authenticated.
///
/// Messages are deliberately generic; details are logged server-side.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("SAP authentication failed: {0}")]
    RemoteAuthFailed(String),

    #[error("Authentication required. Please login first.")]
    NotAuthenticated,
}
