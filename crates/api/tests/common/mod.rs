#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use httpmock::prelude::*;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use nik_api::auth::password::hash_password;
use nik_api::config::{SapConfig, ServerConfig, SessionConfig};
use nik_api::router::build_app_router;
use nik_api::state::AppState;
use nik_db::models::user::{CreateUser, User};
use nik_db::repositories::UserRepo;

pub const LOCAL_PASSWORD: &str = "laravel-pass-123";
pub const SAP_PASSWORD: &str = "sap-secret";

/// Build a test `ServerConfig` pointing both SAP endpoints at `sap_url`.
///
/// The sync service account is `SVC_SYNC` / `svc-secret`; retries are off.
pub fn test_config(sap_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        session: SessionConfig {
            app_key: "test-app-key".to_string(),
            lifetime_mins: 120,
            secure_cookie: false,
        },
        sap: SapConfig {
            config_api_url: sap_url.to_string(),
            confirmation_api_url: sap_url.to_string(),
            timeout_secs: 5,
            retry_times: 1,
            retry_sleep_ms: 0,
            sync_username: Some("SVC_SYNC".to_string()),
            sync_password: Some("svc-secret".to_string()),
        },
    }
}

/// Build the full application router against a mocked SAP gateway.
pub fn build_test_app(pool: PgPool, sap: &MockServer) -> Router {
    build_test_app_with(pool, test_config(&sap.base_url()))
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone()).expect("test state should build");
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    body: Value,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn post_empty(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` part of the response's `Set-Cookie`, ready to send back.
pub fn session_cookie_of(response: &Response<Body>) -> String {
    let header = response
        .headers()
        .get(SET_COOKIE)
        .expect("response should set a cookie")
        .to_str()
        .unwrap();
    header.split(';').next().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> User {
    let input = CreateUser {
        username: username.to_string(),
        name: format!("{username} Name"),
        email: Some(format!("{}@example.com", username.to_lowercase())),
        password_hash: hash_password(LOCAL_PASSWORD).unwrap(),
        role: role.to_string(),
    };
    UserRepo::create(pool, &input).await.unwrap()
}

/// Accept `username` / [`SAP_PASSWORD`] at the SAP login endpoint.
pub fn mock_sap_login<'a>(sap: &'a MockServer, username: &str) -> httpmock::Mock<'a> {
    sap.mock(|when, then| {
        when.method(POST)
            .path("/api/sap-login")
            .header("X-SAP-Username", username)
            .header("X-SAP-Password", SAP_PASSWORD);
        then.status(200).json_body(json!({"success": true}));
    })
}

/// Log `username` in through the API and return the session cookie.
pub async fn login(app: &Router, username: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/login",
        json!({
            "username": username,
            "password_laravel": LOCAL_PASSWORD,
            "password_sap": SAP_PASSWORD,
        }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie_of(&response)
}

/// Create `username`, accept it at SAP, and log in.
pub async fn logged_in(pool: &PgPool, app: &Router, sap: &MockServer, username: &str) -> String {
    create_user(pool, username, "user").await;
    mock_sap_login(sap, username);
    login(app, username).await
}
