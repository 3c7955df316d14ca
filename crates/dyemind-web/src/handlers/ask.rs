//! Free-form question endpoint backed by the query assistant.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// POST /api/ask — answer an arbitrary question. The assistant never
/// errors; a failed backend yields its sentinel answer with status 200.
pub async fn ask(
    State(state): State<SharedState>,
    Json(payload): Json<AskRequest>,
) -> impl IntoResponse {
    let question = payload.question.trim();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({ "error": "question must not be empty" })),
        )
            .into_response();
    }

    let answer = state.assistant.answer(question).await;
    axum::Json(json!({ "question": question, "answer": answer })).into_response()
}
