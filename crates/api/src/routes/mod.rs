pub mod auth;
pub mod health;
pub mod nik;
pub mod pages;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                 login (public)
/// /auth/logout                logout (public, clears any session)
/// /auth/check                 session status (dual auth)
/// /auth/user                  account details (dual auth)
/// /auth/validate-sap          re-check SAP credential (dual auth)
///
/// /nik/display                list local or live records (dual auth)
/// /nik/insert                 SAP passthrough (dual auth)
/// /nik/delete                 SAP passthrough (dual auth)
/// /nik/sync                   replace local mirror (dual auth)
/// /nik/statistics             mirror freshness (dual auth)
/// /nik/test-connection        SAP health check (dual auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/nik", nik::router())
}
