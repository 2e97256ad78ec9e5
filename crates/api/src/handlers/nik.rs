//! Handlers for the `/api/nik` resource.
//!
//! Display reads the local mirror (or SAP live). Insert and delete go
//! straight to SAP and never touch the mirror; only sync rewrites it.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nik_core::display::{DataSource, PageInfo, SOURCE_SAP};
use nik_db::models::nik_confirmation::NikConfirmationFilter;
use nik_db::repositories::NikConfirmationRepo;
use nik_sap::messages::{GatewayReply, ListReply};
use nik_sap::{ListFilter, SapApiError};
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::dual_auth::DualAuthSession;
use crate::query::{AppliedFilters, DisplayParams, NikKeyRequest, SyncRequest};
use crate::response::{
    ConnectionResponse, DisplayResponse, NikRow, RemoteSummary, SapDisplayResponse,
    StatisticsResponse, SyncResponse,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// GET /api/nik/display
///
/// Query: `pernr`, `werks`, `search`, `per_page`, `page`, `sort_by`,
/// `sort_order`, `source` (`database` | `sap` | `both`).
pub async fn display(
    State(state): State<AppState>,
    auth: DualAuthSession,
    Query(params): Query<DisplayParams>,
) -> AppResult<Response> {
    let query = params.validate()?;

    let remote = match query.source {
        DataSource::Database => None,
        DataSource::Sap => {
            let result = fetch_live(&state, &auth, &query.filters).await;
            return Ok(sap_display(result));
        }
        DataSource::Both => {
            let result = fetch_live(&state, &auth, &query.filters).await;
            Some(remote_summary(result))
        }
    };

    let filter = NikConfirmationFilter {
        pernr: query.filters.pernr.clone(),
        werks: query.filters.werks.clone(),
        search: query.filters.search.clone(),
    };
    let rows = NikConfirmationRepo::list(
        &state.pool,
        &filter,
        query.sort_by,
        query.sort_order,
        query.per_page,
        query.offset,
    )
    .await?;
    let total = NikConfirmationRepo::count(&state.pool, &filter).await?;
    let pagination = PageInfo::new(total, query.per_page, query.page, rows.len() as i64);

    tracing::info!(
        user = %auth.user.username,
        source = query.source.as_str(),
        total,
        "NIK display successful",
    );

    Ok(Json(DisplayResponse {
        success: true,
        message: "Data retrieved successfully",
        data: rows.into_iter().map(NikRow::from).collect(),
        pagination,
        filters_applied: query.filters,
        remote,
    })
    .into_response())
}

async fn fetch_live(
    state: &AppState,
    auth: &DualAuthSession,
    filters: &AppliedFilters,
) -> Result<ListReply, SapApiError> {
    let filter = ListFilter::new(filters.pernr.as_deref(), filters.werks.as_deref());
    state
        .gateway
        .list_confirmations(&auth.credentials, &filter)
        .await
}

/// `source=sap`: pass the live listing through, `400` on failure.
fn sap_display(result: Result<ListReply, SapApiError>) -> Response {
    match result {
        Ok(reply) => Json(SapDisplayResponse {
            success: true,
            message: reply
                .message
                .clone()
                .unwrap_or_else(|| "Data retrieved from SAP".to_string()),
            record_count: reply.record_count(),
            data: reply.data,
            source: SOURCE_SAP,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Live SAP display failed");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": e.user_message(),
                    "code": "REMOTE_FETCH_FAILED",
                })),
            )
                .into_response()
        }
    }
}

fn remote_summary(result: Result<ListReply, SapApiError>) -> RemoteSummary {
    match result {
        Ok(reply) => RemoteSummary {
            success: true,
            record_count: reply.record_count(),
            message: reply.message,
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Live SAP display failed, serving local data");
            RemoteSummary {
                success: false,
                message: None,
                error: Some(e.user_message()),
                record_count: 0,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Insert / delete (SAP passthrough)
// ---------------------------------------------------------------------------

/// POST /api/nik/insert
pub async fn insert(
    State(state): State<AppState>,
    auth: DualAuthSession,
    Json(input): Json<NikKeyRequest>,
) -> AppResult<(StatusCode, Json<GatewayReply>)> {
    let (pernr, werks) = input.validate()?;
    let reply = state.gateway.insert(&auth.credentials, &pernr, &werks).await?;
    Ok(passthrough("insert", &auth, &pernr, &werks, reply))
}

/// POST /api/nik/delete
pub async fn delete(
    State(state): State<AppState>,
    auth: DualAuthSession,
    Json(input): Json<NikKeyRequest>,
) -> AppResult<(StatusCode, Json<GatewayReply>)> {
    let (pernr, werks) = input.validate()?;
    let reply = state.gateway.delete(&auth.credentials, &pernr, &werks).await?;
    Ok(passthrough("delete", &auth, &pernr, &werks, reply))
}

/// Return the gateway reply as-is: `200` on success, `400` otherwise.
fn passthrough(
    action: &str,
    auth: &DualAuthSession,
    pernr: &str,
    werks: &str,
    reply: GatewayReply,
) -> (StatusCode, Json<GatewayReply>) {
    if reply.success {
        tracing::info!(user = %auth.user.username, action, pernr, werks, "NIK write successful");
        (StatusCode::OK, Json(reply))
    } else {
        tracing::error!(
            user = %auth.user.username,
            action,
            pernr,
            werks,
            error = reply.failure_text(),
            "NIK write failed",
        );
        (StatusCode::BAD_REQUEST, Json(reply))
    }
}

// ---------------------------------------------------------------------------
// Sync and maintenance
// ---------------------------------------------------------------------------

/// POST /api/nik/sync
///
/// Body (optional): `{ "pernr": ..., "werks": ... }`. Replaces the whole
/// local mirror with the SAP feed.
pub async fn sync(
    State(state): State<AppState>,
    auth: DualAuthSession,
    body: Option<Json<SyncRequest>>,
) -> AppResult<Json<SyncResponse>> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let filter = ListFilter::new(input.pernr.as_deref(), input.werks.as_deref());

    tracing::info!(
        user = %auth.user.username,
        pernr = filter.pernr.as_deref(),
        werks = filter.werks.as_deref(),
        "NIK sync request received",
    );

    let statistics = state.sync_job.clone().run_detached(filter).await?;

    Ok(Json(SyncResponse {
        success: true,
        message: "Data synced from SAP",
        statistics,
    }))
}

/// GET /api/nik/statistics
pub async fn statistics(
    State(state): State<AppState>,
    _auth: DualAuthSession,
) -> AppResult<Json<StatisticsResponse>> {
    let statistics = state.sync_job.statistics().await?;
    Ok(Json(StatisticsResponse {
        success: true,
        statistics,
    }))
}

/// POST /api/nik/test-connection
///
/// Checks the confirmation API's health endpoint with the session's SAP
/// credential. A failed check is a `502`.
pub async fn test_connection(
    State(state): State<AppState>,
    auth: DualAuthSession,
) -> AppResult<Json<ConnectionResponse>> {
    let data = state.gateway.health(&auth.credentials).await?;
    Ok(Json(ConnectionResponse {
        success: true,
        message: "SAP connection OK",
        data,
    }))
}
