//! Route definitions for the `/nik` resource. Every route requires a
//! dual-authenticated session.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::nik;
use crate::state::AppState;

/// Routes mounted at `/nik`.
///
/// ```text
/// GET  /display          -> display
/// POST /insert           -> insert
/// POST /delete           -> delete
/// POST /sync             -> sync
/// GET  /statistics       -> statistics
/// POST /test-connection  -> test_connection
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/display", get(nik::display))
        .route("/insert", post(nik::insert))
        .route("/delete", post(nik::delete))
        .route("/sync", post(nik::sync))
        .route("/statistics", get(nik::statistics))
        .route("/test-connection", post(nik::test_connection))
}
