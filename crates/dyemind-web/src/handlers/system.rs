//! Liveness probe.

use axum::response::IntoResponse;
use serde_json::json;

/// GET /health
pub async fn health() -> impl IntoResponse {
    axum::Json(json!({
        "status": "ok",
        "service": "dyemind",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
