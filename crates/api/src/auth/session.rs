//! Opaque session tokens and the cookie that carries them.
//!
//! The browser holds the plaintext token; the database only ever sees its
//! SHA-256 hash, the same way refresh tokens are handled elsewhere.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use nik_core::hashing::sha256_hex;
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "nik_session";

/// Generate a fresh session token.
///
/// Returns `(plaintext, sha256_hex_hash)`. Only the hash is stored.
pub fn generate_session_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let hash = hash_session_token(&plaintext);
    (plaintext, hash)
}

pub fn hash_session_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

/// `Set-Cookie` value for a live session.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}{secure}")
}

/// `Set-Cookie` value that removes the session cookie.
pub fn expired_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Extract the session token from the request's `Cookie` headers, if any.
pub fn read_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn generated_token_hash_matches() {
        let (plaintext, hash) = generate_session_token();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash_session_token(&plaintext), hash);

        let (other, _) = generate_session_token();
        assert_ne!(plaintext, other);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("abc", 7200, false);
        assert_eq!(
            cookie,
            "nik_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=7200"
        );
        assert!(session_cookie("abc", 60, true).ends_with("; Secure"));
        assert!(expired_session_cookie(false).contains("Max-Age=0"));
    }

    #[test]
    fn reads_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("a=1; nik_session=tok-123; b=2"));
        assert_eq!(read_session_cookie(&headers).as_deref(), Some("tok-123"));
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(read_session_cookie(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("nik_session="));
        assert_eq!(read_session_cookie(&headers), None);
    }
}
