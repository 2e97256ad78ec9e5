//! HTTP-level tests for the `/api/nik` endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use common::{body_json, get, logged_in, post_empty, post_json, test_config};
use httpmock::prelude::*;
use serde_json::json;
use sqlx::PgPool;

use nik_core::sync::SYNC_LOCK_ID;
use nik_db::models::nik_confirmation::CreateNikConfirmation;
use nik_db::repositories::NikConfirmationRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed(pool: &PgPool, pernr: &str, werks: &str, name1: &str) {
    let input = CreateNikConfirmation {
        pernr: pernr.to_string(),
        werks: werks.to_string(),
        name1: name1.to_string(),
        created_by: "HRADMIN".to_string(),
        created_on: NaiveDate::from_ymd_opt(2024, 1, 15),
        synced_at: Utc::now(),
    };
    NikConfirmationRepo::create(pool, &input).await.unwrap();
}

async fn local_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM nik_confirmations")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

// ---------------------------------------------------------------------------
// Display: local mirror
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn display_requires_dual_auth(pool: PgPool) {
    let sap = MockServer::start();
    let app = common::build_test_app(pool, &sap);

    let response = get(&app, "/api/nik/display", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHENTICATED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn display_formats_rows_and_paginates(pool: PgPool) {
    seed(&pool, "00000123", "AB  ", "Alice").await;
    seed(&pool, "00000456", "AB01", "Bob").await;
    seed(&pool, "00000789", "CD  ", "Carol").await;
    let sap = MockServer::start();
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = get(&app, "/api/nik/display?per_page=2&page=1", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Data retrieved successfully");
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["pernr"], "00000123");
    assert_eq!(data[0]["pernr_display"], "123");
    assert_eq!(data[0]["werks"], "AB");
    assert_eq!(data[0]["created_on"], "15.01.2024");
    assert!(data[0]["synced_at"].as_str().unwrap().len() == 19);

    assert_eq!(
        json["pagination"],
        json!({"total": 3, "per_page": 2, "current_page": 1, "last_page": 2, "from": 1, "to": 2})
    );
    assert_eq!(json["filters_applied"], json!({}));
    assert!(json.get("remote").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn display_applies_filters(pool: PgPool) {
    seed(&pool, "00000123", "AB  ", "Alice Smith").await;
    seed(&pool, "00000456", "AB01", "Bob Jones").await;
    seed(&pool, "00000789", "CD  ", "Carol Smith").await;
    let sap = MockServer::start();
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let json = body_json(get(&app, "/api/nik/display?pernr=123", Some(&cookie)).await).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["filters_applied"], json!({"pernr": "123"}));

    let json = body_json(get(&app, "/api/nik/display?werks=AB", Some(&cookie)).await).await;
    assert_eq!(json["pagination"]["total"], 2);

    let json = body_json(
        get(&app, "/api/nik/display?search=smith&sort_by=name1&sort_order=desc", Some(&cookie)).await,
    )
    .await;
    let names: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name1"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Carol Smith", "Alice Smith"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn display_rejects_unknown_sort_and_source(pool: PgPool) {
    let sap = MockServer::start();
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    for uri in [
        "/api/nik/display?sort_by=password_hash",
        "/api/nik/display?sort_order=up",
        "/api/nik/display?source=cache",
    ] {
        let response = get(&app, uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn display_rejects_page_past_offset_range(pool: PgPool) {
    let sap = MockServer::start();
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = get(&app, "/api/nik/display?page=9223372036854775807", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "The page field is too large.");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn display_empty_page_has_no_bounds(pool: PgPool) {
    let sap = MockServer::start();
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let json = body_json(get(&app, "/api/nik/display?page=5", Some(&cookie)).await).await;
    assert_eq!(json["data"], json!([]));
    assert_eq!(json["pagination"]["total"], 0);
    assert_eq!(json["pagination"]["last_page"], 1);
    assert!(json["pagination"]["from"].is_null());
    assert!(json["pagination"]["to"].is_null());
}

// ---------------------------------------------------------------------------
// Display: live SAP
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn display_from_sap_uses_session_credential(pool: PgPool) {
    let sap = MockServer::start();
    let display = sap.mock(|when, then| {
        when.method(POST)
            .path("/api/nik-conf/display")
            .header("X-SAP-Username", "JDOE")
            .json_body(json!({"username": "JDOE", "password": "sap-secret", "werks": "AB"}));
        then.status(200).json_body(json!({
            "success": true,
            "data": [{"PERNR": "123", "WERKS": "AB", "NAME1": "Live"}],
            "record_count": 1,
        }));
    });
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = get(&app, "/api/nik/display?source=sap&werks=AB", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["source"], "sap");
    assert_eq!(json["record_count"], 1);
    assert_eq!(json["message"], "Data retrieved from SAP");
    assert_eq!(json["data"][0]["NAME1"], "Live");
    display.assert_calls(1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn display_from_sap_failure_is_400(pool: PgPool) {
    let sap = MockServer::start();
    sap.mock(|when, then| {
        when.method(POST).path("/api/nik-conf/display");
        then.status(200)
            .json_body(json!({"success": false, "message": "No authorization for plant"}));
    });
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = get(&app, "/api/nik/display?source=sap", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No authorization for plant");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn display_both_serves_local_rows_with_remote_summary(pool: PgPool) {
    seed(&pool, "00000123", "AB  ", "Local").await;
    let sap = MockServer::start();
    sap.mock(|when, then| {
        when.method(POST).path("/api/nik-conf/display");
        then.status(503).body("maintenance");
    });
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = get(&app, "/api/nik/display?source=both", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["name1"], "Local");
    assert_eq!(json["remote"]["success"], false);
    assert_eq!(json["remote"]["record_count"], 0);
}

// ---------------------------------------------------------------------------
// Insert / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn insert_is_passed_through_without_local_change(pool: PgPool) {
    let sap = MockServer::start();
    let insert = sap.mock(|when, then| {
        when.method(POST)
            .path("/api/nik-conf/insert")
            .header("X-SAP-Username", "JDOE")
            .header("X-SAP-Password", "sap-secret")
            .json_body(json!({"pernr": "123", "werks": "AB"}));
        then.status(200)
            .json_body(json!({"success": true, "message": "NIK confirmation created"}));
    });
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = post_json(
        &app,
        "/api/nik/insert",
        json!({"pernr": "123", "werks": "AB"}),
        Some(&cookie),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"success": true, "message": "NIK confirmation created"})
    );
    insert.assert_calls(1);
    assert_eq!(local_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_insert_reply_is_400(pool: PgPool) {
    let sap = MockServer::start();
    sap.mock(|when, then| {
        when.method(POST).path("/api/nik-conf/insert");
        then.status(200)
            .json_body(json!({"success": false, "message": "Entry already exists", "rfc": "E01"}));
    });
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = post_json(
        &app,
        "/api/nik/insert",
        json!({"pernr": "123", "werks": "AB"}),
        Some(&cookie),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Entry already exists");
    assert_eq!(json["rfc"], "E01");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_sends_flag_and_validates_input(pool: PgPool) {
    let sap = MockServer::start();
    let delete = sap.mock(|when, then| {
        when.method(POST)
            .path("/api/nik-conf/delete")
            .json_body(json!({"pernr": "123", "werks": "AB", "delete_flag": "X"}));
        then.status(200).json_body(json!({"success": true, "message": "Deleted"}));
    });
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = post_json(
        &app,
        "/api/nik/delete",
        json!({"pernr": "123", "werks": "  "}),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    delete.assert_calls(0);

    let response = post_json(
        &app,
        "/api/nik/delete",
        json!({"pernr": "123", "werks": "AB"}),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    delete.assert_calls(1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unreadable_gateway_error_is_502(pool: PgPool) {
    let sap = MockServer::start();
    sap.mock(|when, then| {
        when.method(POST).path("/api/nik-conf/insert");
        then.status(502).body("<html>Bad Gateway</html>");
    });
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = post_json(
        &app,
        "/api/nik/insert",
        json!({"pernr": "123", "werks": "AB"}),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "GATEWAY_ERROR");
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sync_replaces_mirror_with_service_account_feed(pool: PgPool) {
    seed(&pool, "99999999", "ZZZZ", "Stale").await;
    let sap = MockServer::start();
    let feed = sap.mock(|when, then| {
        when.method(POST)
            .path("/api/nik-conf/display")
            .header("X-SAP-Username", "SVC_SYNC")
            .json_body(json!({"username": "SVC_SYNC", "password": "svc-secret", "pernr": "123"}));
        then.status(200).json_body(json!({
            "success": true,
            "data": [
                {"PERNR": "123", "WERKS": "AB", "NAME1": "X", "CREATED_ON": "20240101"},
                {"WERKS": "AB"},
            ],
        }));
    });
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = post_json(&app, "/api/nik/sync", json!({"pernr": "123"}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(
        json["statistics"],
        json!({"fetched": 2, "inserted": 1, "updated": 0, "deleted": 1, "skipped": 1, "errors": 0})
    );
    feed.assert_calls(1);

    let json = body_json(get(&app, "/api/nik/display", Some(&cookie)).await).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["pernr"], "00000123");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sync_without_body_fetches_everything(pool: PgPool) {
    let sap = MockServer::start();
    let feed = sap.mock(|when, then| {
        when.method(POST)
            .path("/api/nik-conf/display")
            .json_body(json!({"username": "SVC_SYNC", "password": "svc-secret"}));
        then.status(200).json_body(json!({"success": true, "data": []}));
    });
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = post_empty(&app, "/api/nik/sync", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["statistics"]["fetched"], 0);
    feed.assert_calls(1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sync_without_service_account_is_misconfigured(pool: PgPool) {
    let sap = MockServer::start();
    let mut config = test_config(&sap.base_url());
    config.sap.sync_password = None;
    let app = common::build_test_app_with(pool.clone(), config);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = post_empty(&app, "/api/nik/sync", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "MISCONFIGURED_CREDENTIALS");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sync_fetch_failure_is_502(pool: PgPool) {
    seed(&pool, "99999999", "ZZZZ", "Stale").await;
    let sap = MockServer::start();
    sap.mock(|when, then| {
        when.method(POST)
            .path("/api/nik-conf/display")
            .header("X-SAP-Username", "SVC_SYNC");
        then.status(500).body("RFC down");
    });
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = post_empty(&app, "/api/nik/sync", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "REMOTE_FETCH_FAILED");
    assert_eq!(local_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_sync_is_409(pool: PgPool) {
    let sap = MockServer::start();
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let mut holder = pool.acquire().await.unwrap();
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(SYNC_LOCK_ID)
        .execute(&mut *holder)
        .await
        .unwrap();

    let response = post_empty(&app, "/api/nik/sync", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "SYNC_ALREADY_RUNNING");
}

// ---------------------------------------------------------------------------
// Statistics and connection test
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn statistics_summarize_mirror(pool: PgPool) {
    seed(&pool, "00000001", "AB  ", "A").await;
    seed(&pool, "00000002", "AB  ", "B").await;
    let sap = MockServer::start();
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let json = body_json(get(&app, "/api/nik/statistics", Some(&cookie)).await).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["statistics"]["total_records"], 2);
    assert_eq!(json["statistics"]["synced_today"], 2);
    assert!(json["statistics"]["last_sync"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_connection_checks_health(pool: PgPool) {
    let sap = MockServer::start();
    let mut health = sap.mock(|when, then| {
        when.method(GET).path("/health").header("X-SAP-Username", "JDOE");
        then.status(200).json_body(json!({"status": "healthy"}));
    });
    let app = common::build_test_app(pool.clone(), &sap);
    let cookie = logged_in(&pool, &app, &sap, "JDOE").await;

    let response = post_empty(&app, "/api/nik/test-connection", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "SAP connection OK");
    assert_eq!(json["data"]["status"], "healthy");

    health.delete();
    sap.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(503).body("down");
    });

    let response = post_empty(&app, "/api/nik/test-connection", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["success"], false);
}
