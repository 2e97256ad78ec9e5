//! Handlers for the `/api/auth` resource (login, logout, session checks).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderName};
use axum::Json;
use nik_core::error::CoreError;
use nik_db::models::user::UserResponse;
use serde::Deserialize;

use crate::auth::dual::{self, LoginAttempt};
use crate::auth::session::{expired_session_cookie, read_session_cookie, session_cookie};
use crate::error::AppResult;
use crate::middleware::dual_auth::DualAuthSession;
use crate::query::non_blank;
use crate::response::{
    CheckResponse, LoginResponse, MessageResponse, UserDetails, UserInfoResponse,
    ValidateSapResponse,
};
use crate::state::AppState;

/// Response headers carrying a `Set-Cookie`.
type CookieHeader = [(HeaderName, String); 1];

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/auth/login`.
///
/// `password_laravel` is the local account password, `password_sap` the
/// SAP password for the same username.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password_laravel: Option<String>,
    pub password_sap: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/login
///
/// Authenticate against the local account and SAP. Sets the session
/// cookie on success.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<(CookieHeader, Json<LoginResponse>)> {
    let username = required("username", input.username)?;
    // Passwords are not trimmed.
    let password_local = required_raw("password_laravel", input.password_laravel)?;
    let password_sap = required_raw("password_sap", input.password_sap)?;
    let presented = read_session_cookie(&headers);

    let outcome = dual::login(
        &state,
        LoginAttempt {
            username: &username,
            password_local: &password_local,
            password_sap: &password_sap,
            presented_token: presented.as_deref(),
        },
    )
    .await?;

    let max_age = state.config.session.lifetime_mins * 60;
    let cookie = session_cookie(&outcome.token, max_age, state.config.session.secure_cookie);

    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            user: UserResponse::from(&outcome.user),
        }),
    ))
}

/// POST /api/auth/logout
///
/// Deletes the server-side session (and with it the SAP credential) and
/// expires the cookie. Succeeds even without a session.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<(CookieHeader, Json<MessageResponse>)> {
    let token = read_session_cookie(&headers);
    dual::logout(&state, token.as_deref()).await?;

    Ok((
        [(SET_COOKIE, expired_session_cookie(state.config.session.secure_cookie))],
        Json(MessageResponse::ok("Logout successful")),
    ))
}

/// GET /api/auth/check
pub async fn check(auth: DualAuthSession) -> Json<CheckResponse> {
    Json(CheckResponse {
        authenticated: true,
        user: UserResponse::from(&auth.user),
    })
}

/// GET /api/auth/user
pub async fn user(auth: DualAuthSession) -> Json<UserInfoResponse> {
    Json(UserInfoResponse {
        success: true,
        user: UserDetails::from(&auth.user),
    })
}

/// POST /api/auth/validate-sap
///
/// Re-checks the session's SAP credential. An invalid credential is a
/// `200` with `valid: false`, not an error.
pub async fn validate_sap(
    State(state): State<AppState>,
    auth: DualAuthSession,
) -> AppResult<Json<ValidateSapResponse>> {
    let valid = dual::validate_sap_session(&state, &auth).await?;
    Ok(Json(ValidateSapResponse {
        success: true,
        valid,
        message: if valid {
            "SAP session valid"
        } else {
            "SAP session invalid"
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn required(field: &str, value: Option<String>) -> Result<String, CoreError> {
    non_blank(value).ok_or_else(|| CoreError::Validation(format!("The {field} field is required.")))
}

fn required_raw(field: &str, value: Option<String>) -> Result<String, CoreError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CoreError::Validation(format!("The {field} field is required.")))
}
