//! LLM backend trait and concrete implementations.
//!
//! Backends:
//!   HuggingFaceBackend      — Hugging Face Inference API (bare `inputs`
//!                             payload, e.g. facebook/bart-large-cnn,
//!                             google/flan-t5-large)
//!   OpenAiCompatibleBackend — any OpenAI-compatible chat endpoint
//!                             (OpenAI, LMStudio, vLLM, Ollama, …)
//!
//! Authentication is an opaque bearer credential supplied by the hosting
//! environment; backends never log it.
//!
//! All backend traffic goes through the capped [`SandboxClient`], like the
//! source connectors; the allowlist already carries the inference domains.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use dyemind_common::error::DyeMindError;
use dyemind_common::sandbox::SandboxClient;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
    #[error(transparent)]
    Sandbox(#[from] DyeMindError),
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String, // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Single-shot request carrying one user message.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(text)],
            model: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    fn model_id(&self) -> &str;
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn parse_openai_response(json: &serde_json::Value, fallback_model: &str) -> LlmResponse {
    LlmResponse {
        content: json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        model: json["model"].as_str().unwrap_or(fallback_model).to_string(),
        prompt_tokens: json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    }
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let body: serde_json::Value = resp.json().await?;
    if status >= 400 {
        let msg = body["error"]["message"]
            .as_str()
            .or_else(|| body["error"].as_str())
            .or_else(|| body["message"].as_str())
            .unwrap_or("unknown API error")
            .to_string();
        return Err(LlmError::ApiError { status, message: msg });
    }
    Ok(body)
}

const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(30);

// ── 1. Hugging Face Inference API ────────────────────────────────────────────

pub struct HuggingFaceBackend {
    pub base_url: String,
    pub model: String,
    token: Option<String>,
    client: SandboxClient,
}

impl HuggingFaceBackend {
    pub fn new(model: impl Into<String>, token: Option<String>) -> Result<Self, LlmError> {
        Ok(Self {
            base_url: "https://api-inference.huggingface.co/models".to_string(),
            model: model.into(),
            token,
            client: SandboxClient::with_timeout(DEFAULT_LLM_TIMEOUT)?,
        })
    }

    /// Point at a different inference host (e.g. a local test server).
    /// The host must still be in the sandbox allowlist.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    /// The inference API takes a bare text input; fold the message list
    /// into one string, system text first.
    fn flatten_messages(messages: &[Message]) -> String {
        messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl LlmBackend for HuggingFaceBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let model = req.model.as_deref().unwrap_or(&self.model);
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), model);
        let body = serde_json::json!({ "inputs": Self::flatten_messages(&req.messages) });

        let resp = self.auth(self.client.post(&url)?).json(&body).send().await?;
        let json = check_response_status(resp).await?;

        // Summarization models answer [{"summary_text": …}], text2text
        // models answer [{"generated_text": …}].
        let content = json[0]["summary_text"]
            .as_str()
            .or_else(|| json[0]["generated_text"].as_str())
            .or_else(|| json["generated_text"].as_str())
            .unwrap_or("")
            .to_string();

        if content.is_empty() {
            return Err(LlmError::Unavailable(format!(
                "model {} returned no text", model
            )));
        }

        Ok(LlmResponse {
            content,
            model: model.to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ── 2. OpenAI-Compatible (OpenAI, LMStudio, vLLM, Ollama, …) ─────────────────

pub struct OpenAiCompatibleBackend {
    pub base_url: String,
    pub model: String,
    api_key: Option<String>,
    client: SandboxClient,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client: SandboxClient::with_timeout(DEFAULT_LLM_TIMEOUT)?,
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(k) => req.bearer_auth(k),
            None => req,
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model":       req.model.as_deref().unwrap_or(&self.model),
            "messages":    req.messages,
            "max_tokens":  req.max_tokens.unwrap_or(1024),
            "temperature": req.temperature.unwrap_or(0.1),
        });
        let resp = self.auth(self.client.post(&url)?).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        Ok(parse_openai_response(&json, &self.model))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
