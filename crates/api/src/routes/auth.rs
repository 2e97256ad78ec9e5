//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login         -> login
/// POST /logout        -> logout
/// GET  /check         -> check (dual auth)
/// GET  /user          -> user (dual auth)
/// POST /validate-sap  -> validate_sap (dual auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/check", get(auth::check))
        .route("/user", get(auth::user))
        .route("/validate-sap", post(auth::validate_sap))
}
