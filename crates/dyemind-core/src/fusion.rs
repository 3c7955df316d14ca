//! Fusion synthesizer — combines the encyclopedia extract, the canonical
//! structure encoding and the literature summaries into one prompt and
//! delegates narrative generation to the configured backend.

use std::sync::Arc;
use tracing::warn;

use dyemind_llm::{LlmBackend, LlmRequest, Message};

/// Fixed sentinel returned when narrative generation fails.
pub const FUSION_FAILED: &str = "Unified narrative unavailable (generation failed).";

const FUSION_SYSTEM_PROMPT: &str =
    "You are DyeMind, a scientific assistant. Combine the provided encyclopedia \
     extract, chemical structure encoding and literature summaries into one \
     coherent narrative about the queried fluorophore. If a section is empty, \
     work with what remains.";

pub struct FusionSynthesizer {
    backend: Arc<dyn LlmBackend>,
    model: Option<String>,
}

impl FusionSynthesizer {
    pub fn new(backend: Arc<dyn LlmBackend>, model: Option<String>) -> Self {
        Self { backend, model }
    }

    /// Build the fusion prompt. The extract and the structure encoding are
    /// embedded verbatim — no truncation; summaries joined by newlines in
    /// record order.
    pub fn build_prompt(extract: &str, smiles: &str, summaries: &[String]) -> String {
        format!(
            "Encyclopedia extract:\n{}\n\nCanonical structure (SMILES):\n{}\n\nLiterature summaries:\n{}",
            extract,
            smiles,
            summaries.join("\n"),
        )
    }

    /// Produce the final narrative. Never errors; failure yields the
    /// [`FUSION_FAILED`] sentinel.
    pub async fn fuse(&self, extract: &str, smiles: &str, summaries: &[String]) -> String {
        let prompt = Self::build_prompt(extract, smiles, summaries);

        let mut req = LlmRequest {
            messages: vec![Message::system(FUSION_SYSTEM_PROMPT), Message::user(prompt)],
            model: None,
            max_tokens: None,
            temperature: None,
        };
        if let Some(model) = &self.model {
            req = req.with_model(model.clone());
        }

        match self.backend.complete(req).await {
            Ok(resp) if !resp.content.trim().is_empty() => resp.content,
            Ok(_) => FUSION_FAILED.to_string(),
            Err(e) => {
                warn!(error = %e, "Fusion narrative generation failed");
                FUSION_FAILED.to_string()
            }
        }
    }
}
