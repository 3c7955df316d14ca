//! Query assistant — single-shot free-form question answering, sharing the
//! generative backend contract with the aggregation pipeline but none of
//! its data.

use std::sync::Arc;
use tracing::warn;

use dyemind_llm::{LlmBackend, LlmRequest};

/// Fixed sentinel returned when the backend cannot answer.
pub const ANSWER_UNAVAILABLE: &str = "Unable to get an answer at the moment.";

pub struct QueryAssistant {
    backend: Arc<dyn LlmBackend>,
    model: Option<String>,
}

impl QueryAssistant {
    pub fn new(backend: Arc<dyn LlmBackend>, model: Option<String>) -> Self {
        Self { backend, model }
    }

    /// Answer an arbitrary question with the raw text as input.
    pub async fn answer(&self, question: &str) -> String {
        let mut req = LlmRequest::user_text(question);
        if let Some(model) = &self.model {
            req = req.with_model(model.clone());
        }

        match self.backend.complete(req).await {
            Ok(resp) if !resp.content.trim().is_empty() => resp.content,
            Ok(_) => ANSWER_UNAVAILABLE.to_string(),
            Err(e) => {
                warn!(error = %e, "Assistant answer failed");
                ANSWER_UNAVAILABLE.to_string()
            }
        }
    }
}
