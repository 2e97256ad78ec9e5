//! Session extractors for dual-authenticated requests.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use nik_db::models::sap_session::SapSession;
use nik_db::models::user::User;
use nik_db::repositories::{SapSessionRepo, UserRepo};
use nik_sap::SapCredentials;

use crate::auth::session::{hash_session_token, read_session_cookie};
use crate::auth::AuthError;
use crate::error::AppError;
use crate::state::AppState;

/// A request whose session holds both an active local account and a SAP
/// credential.
///
/// The credential is decrypted while extracting and dropped with the
/// request. Use it in any handler that calls SAP on the user's behalf:
///
/// ```ignore
/// async fn my_handler(State(state): State<AppState>, auth: DualAuthSession) -> AppResult<Json<()>> {
///     state.gateway.health(&auth.credentials).await?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DualAuthSession {
    pub user: User,
    pub session: SapSession,
    pub credentials: SapCredentials,
}

impl FromRequestParts<AppState> for DualAuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = read_session_cookie(&parts.headers).ok_or(AuthError::NotAuthenticated)?;

        match resolve(state, &token).await? {
            Some(auth) => Ok(auth),
            None => {
                tracing::warn!(path = %parts.uri.path(), "Dual authentication required");
                Err(AuthError::NotAuthenticated.into())
            }
        }
    }
}

/// Page variant of [`DualAuthSession`]: redirects to `/login` instead of
/// answering with a JSON 401.
#[derive(Debug, Clone)]
pub struct DualAuthPage(pub DualAuthSession);

impl FromRequestParts<AppState> for DualAuthPage {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match DualAuthSession::from_request_parts(parts, state).await {
            Ok(auth) => Ok(Self(auth)),
            Err(AppError::Auth(_)) => Err(Redirect::to("/login").into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}

/// Look up the session behind `token`. `None` when any half is missing.
async fn resolve(state: &AppState, token: &str) -> Result<Option<DualAuthSession>, AppError> {
    let hash = hash_session_token(token);
    let Some(session) = SapSessionRepo::find_active_by_token_hash(&state.pool, &hash).await? else {
        return Ok(None);
    };
    if !session.has_sap_credentials() {
        return Ok(None);
    }

    let Some(user) = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .filter(|u| u.is_active)
    else {
        return Ok(None);
    };

    let password = match state.cipher.decrypt(&session.sap_password_encrypted) {
        Ok(password) => password,
        Err(e) => {
            tracing::warn!(session_id = session.id, error = %e, "Stored SAP credential unreadable");
            return Ok(None);
        }
    };

    Ok(Some(DualAuthSession {
        credentials: SapCredentials::new(session.sap_username.clone(), password),
        user,
        session,
    }))
}
