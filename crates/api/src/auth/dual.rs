//! Dual authentication: a local account password followed by a SAP
//! credential check for the same username.
//!
//! A session is only created when both succeed. The SAP password is sealed
//! with the application cipher before it is written to `sap_sessions`.

use chrono::Utc;
use nik_db::models::sap_session::{CreateSapSession, SapSession};
use nik_db::models::user::User;
use nik_db::repositories::{SapSessionRepo, UserRepo};
use nik_sap::SapCredentials;

use crate::auth::password::verify_password;
use crate::auth::session::{generate_session_token, hash_session_token};
use crate::auth::AuthError;
use crate::error::{AppError, AppResult};
use crate::middleware::dual_auth::DualAuthSession;
use crate::state::AppState;

/// Login input, already checked for presence by the handler.
#[derive(Debug)]
pub struct LoginAttempt<'a> {
    pub username: &'a str,
    pub password_local: &'a str,
    pub password_sap: &'a str,
    /// Token of any session the client already holds; it is rotated away.
    pub presented_token: Option<&'a str>,
}

/// A freshly created dual-authenticated session.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub session: SapSession,
    /// Plaintext token for the cookie. Never stored.
    pub token: String,
}

/// Run the login steps in order, stopping at the first failure:
///
/// 1. active local account by username
/// 2. local password against the Argon2id hash
/// 3. SAP credential check for the same username
/// 4. new session row, previous session removed, login recorded
pub async fn login(state: &AppState, attempt: LoginAttempt<'_>) -> AppResult<LoginOutcome> {
    let Some(user) = UserRepo::find_active_by_username(&state.pool, attempt.username).await?
    else {
        tracing::warn!(username = %attempt.username, "Login failed: unknown or inactive account");
        return Err(AuthError::InvalidCredentials.into());
    };

    let password_valid = verify_password(attempt.password_local, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(username = %attempt.username, "Login failed: wrong local password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let creds = SapCredentials::new(&user.username, attempt.password_sap);
    if let Err(e) = state.gateway.check_credentials(&creds).await {
        tracing::warn!(username = %attempt.username, error = %e, "Login failed: SAP rejected credentials");
        return Err(AuthError::RemoteAuthFailed(e.user_message()).into());
    }

    if let Some(old) = attempt.presented_token {
        SapSessionRepo::delete_by_token_hash(&state.pool, &hash_session_token(old)).await?;
    }

    let (token, token_hash) = generate_session_token();
    let expires_at = Utc::now() + chrono::Duration::minutes(state.config.session.lifetime_mins);
    let input = CreateSapSession {
        session_token_hash: token_hash,
        user_id: user.id,
        sap_username: user.username.clone(),
        sap_password_encrypted: state.cipher.encrypt(attempt.password_sap)?,
        user_display: Some(user.name.clone()),
        expires_at,
    };
    let session = SapSessionRepo::create(&state.pool, &input).await?;
    UserRepo::record_sap_login(&state.pool, user.id, session.id).await?;

    tracing::info!(user_id = user.id, username = %user.username, "Dual login successful");

    Ok(LoginOutcome {
        user,
        session,
        token,
    })
}

/// Remove the server-side session behind `token`, if there is one.
pub async fn logout(state: &AppState, token: Option<&str>) -> AppResult<()> {
    let Some(token) = token else {
        return Ok(());
    };
    if SapSessionRepo::delete_by_token_hash(&state.pool, &hash_session_token(token)).await? {
        tracing::info!("Session logged out");
    }
    Ok(())
}

/// Re-check the cached SAP credential without touching the local password.
///
/// Returns `false` when SAP refuses it or cannot be reached.
pub async fn validate_sap_session(state: &AppState, auth: &DualAuthSession) -> AppResult<bool> {
    match state.gateway.check_credentials(&auth.credentials).await {
        Ok(_) => {
            SapSessionRepo::touch_validated(&state.pool, auth.session.id).await?;
            Ok(true)
        }
        Err(e) => {
            tracing::warn!(user_id = auth.user.id, error = %e, "SAP session validation failed");
            Ok(false)
        }
    }
}
