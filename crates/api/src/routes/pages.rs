use axum::routing::get;
use axum::Router;

use crate::handlers::pages;
use crate::state::AppState;

/// Page routes, mounted at the root.
///
/// `/dashboard` and `/nik-confirmation` redirect to `/login` without a
/// dual-authenticated session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/login", get(pages::login))
        .route("/dashboard", get(pages::dashboard))
        .route("/nik-confirmation", get(pages::nik_confirmation))
}
