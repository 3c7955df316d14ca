//! Configuration loading for DyeMind.
//! Reads dyemind.toml from the current directory or the path in the
//! DYEMIND_CONFIG env var; secrets may be overridden from the environment.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::info;

use dyemind_common::error::DyeMindError;
use dyemind_llm::{HuggingFaceBackend, LlmBackend, LlmError, OpenAiCompatibleBackend};

#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Literature search result cap (one known deployment raises it to 10).
    #[serde(default = "default_search_result_cap")]
    pub search_result_cap: usize,
    /// Bounded per-connector-call timeout.
    #[serde(default = "default_per_source_timeout_ms")]
    pub per_source_timeout_ms: u64,

    /// Opaque bearer credential for the Hugging Face Inference API.
    #[serde(default)]
    pub hf_token: Option<SecretString>,
    /// Optional NCBI E-utilities API key (raises their rate limit).
    #[serde(default)]
    pub ncbi_api_key: Option<String>,

    /// "huggingface" or "openai_compatible".
    #[serde(default = "default_llm_provider")]
    pub llm_provider: String,
    /// Base URL for the OpenAI-compatible provider.
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default)]
    pub llm_api_key: Option<SecretString>,

    #[serde(default = "default_summarize_model")]
    pub summarize_model: String,
    #[serde(default = "default_answer_model")]
    pub answer_model: String,
    #[serde(default = "default_fusion_model")]
    pub fusion_model: String,

    /// Opt-in AI rewrite of the user query into connector-friendly keywords.
    #[serde(default)]
    pub refine_queries: bool,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_search_result_cap() -> usize { 3 }
fn default_per_source_timeout_ms() -> u64 { 10_000 }
fn default_llm_provider() -> String { "huggingface".to_string() }
fn default_llm_base_url() -> String { "https://api.openai.com".to_string() }
fn default_summarize_model() -> String { "facebook/bart-large-cnn".to_string() }
fn default_answer_model() -> String { "google/flan-t5-large".to_string() }
fn default_fusion_model() -> String { "google/flan-t5-large".to_string() }
fn default_listen_addr() -> String { "127.0.0.1:5870".to_string() }

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            search_result_cap: default_search_result_cap(),
            per_source_timeout_ms: default_per_source_timeout_ms(),
            hf_token: None,
            ncbi_api_key: None,
            llm_provider: default_llm_provider(),
            llm_base_url: default_llm_base_url(),
            llm_api_key: None,
            summarize_model: default_summarize_model(),
            answer_model: default_answer_model(),
            fusion_model: default_fusion_model(),
            refine_queries: false,
            listen_addr: default_listen_addr(),
        }
    }
}

impl CoreConfig {
    /// Load from DYEMIND_CONFIG, ./dyemind.toml, or defaults, then apply
    /// environment overrides for secrets.
    pub fn load() -> Result<Self, DyeMindError> {
        let path = std::env::var("DYEMIND_CONFIG").unwrap_or_else(|_| "dyemind.toml".to_string());
        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| DyeMindError::Config(format!("Read {} failed: {}", path, e)))?;
            info!(path = %path, "Loaded configuration file");
            toml::from_str(&content)
                .map_err(|e| DyeMindError::Config(format!("Parse {} failed: {}", path, e)))?
        } else {
            info!("No configuration file found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("DYEMIND_HF_TOKEN") {
            self.hf_token = Some(SecretString::from(token));
        }
        if let Ok(key) = std::env::var("DYEMIND_LLM_API_KEY") {
            self.llm_api_key = Some(SecretString::from(key));
        }
        if let Ok(key) = std::env::var("DYEMIND_NCBI_API_KEY") {
            self.ncbi_api_key = Some(key);
        }
    }

    pub fn per_source_timeout(&self) -> Duration {
        Duration::from_millis(self.per_source_timeout_ms)
    }
}

/// Construct the generative backend selected by the configuration.
/// The summarizer, fusion synthesizer and assistant share one backend and
/// pass their per-call model overrides through the request.
pub fn build_backend(config: &CoreConfig) -> Result<Arc<dyn LlmBackend>, LlmError> {
    let backend: Arc<dyn LlmBackend> = match config.llm_provider.as_str() {
        "openai_compatible" => Arc::new(OpenAiCompatibleBackend::new(
            config.llm_base_url.clone(),
            config.fusion_model.clone(),
            config
                .llm_api_key
                .as_ref()
                .map(|k| k.expose_secret().to_string()),
        )?),
        _ => Arc::new(HuggingFaceBackend::new(
            config.answer_model.clone(),
            config
                .hf_token
                .as_ref()
                .map(|t| t.expose_secret().to_string()),
        )?),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.search_result_cap, 3);
        assert_eq!(config.per_source_timeout_ms, 10_000);
        assert_eq!(config.summarize_model, "facebook/bart-large-cnn");
        assert_eq!(config.answer_model, "google/flan-t5-large");
        assert!(!config.refine_queries);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
            search_result_cap = 10
            hf_token = "hf_test_token"
        "#;
        let config: CoreConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.search_result_cap, 10);
        assert_eq!(
            config.hf_token.as_ref().unwrap().expose_secret(),
            "hf_test_token"
        );
        // Untouched fields keep their defaults
        assert_eq!(config.per_source_timeout_ms, 10_000);
    }

    #[test]
    fn test_build_backend_huggingface_default() {
        let config = CoreConfig::default();
        let backend = build_backend(&config).unwrap();
        assert_eq!(backend.model_id(), "google/flan-t5-large");
    }

    #[test]
    fn test_build_backend_openai_compatible() {
        let config = CoreConfig {
            llm_provider: "openai_compatible".to_string(),
            llm_base_url: "http://localhost:1234".to_string(),
            fusion_model: "local-model".to_string(),
            ..Default::default()
        };
        let backend = build_backend(&config).unwrap();
        assert_eq!(backend.model_id(), "local-model");
    }
}
