//! Search endpoints — the full aggregation pipeline behind a JSON API,
//! plus a text rendering of the same report for download.

use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// POST /api/search — run the pipeline and return the assembled report.
pub async fn search(
    State(state): State<SharedState>,
    Json(payload): Json<SearchRequest>,
) -> impl IntoResponse {
    let query = payload.query.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({ "error": "query must not be empty" })),
        )
            .into_response();
    }

    info!(query, "Search request");
    let report = state.orchestrator.run(query).await;
    axum::Json(report).into_response()
}

/// POST /api/search/download — same pipeline, rendered as a plain-text
/// attachment.
pub async fn search_download(
    State(state): State<SharedState>,
    Json(payload): Json<SearchRequest>,
) -> impl IntoResponse {
    let query = payload.query.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({ "error": "query must not be empty" })),
        )
            .into_response();
    }

    let report = state.orchestrator.run(query).await;
    let filename = format!(
        "dyemind_{}.txt",
        query.to_lowercase().replace(char::is_whitespace, "_")
    );

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        report.download_text(),
    )
        .into_response()
}
