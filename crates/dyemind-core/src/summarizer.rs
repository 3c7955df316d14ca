//! Abstract summarizer — one generative call per literature abstract.

use std::sync::Arc;
use tracing::warn;

use dyemind_llm::{LlmBackend, LlmRequest};

/// Fixed sentinel returned when generation fails. A legitimate terminal
/// value, not an error.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable.";

pub struct AbstractSummarizer {
    backend: Arc<dyn LlmBackend>,
    model: Option<String>,
}

impl AbstractSummarizer {
    pub fn new(backend: Arc<dyn LlmBackend>, model: Option<String>) -> Self {
        Self { backend, model }
    }

    /// Summarize one abstract. Sentinel abstracts ("No abstract
    /// available.") are passed through like any other text; the model
    /// reflects the lack of information itself.
    pub async fn summarize(&self, text: &str) -> String {
        let mut req = LlmRequest::user_text(text);
        if let Some(model) = &self.model {
            req = req.with_model(model.clone());
        }

        match self.backend.complete(req).await {
            Ok(resp) if !resp.content.trim().is_empty() => resp.content,
            Ok(_) => SUMMARY_UNAVAILABLE.to_string(),
            Err(e) => {
                warn!(error = %e, "Abstract summarization failed");
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }
}
