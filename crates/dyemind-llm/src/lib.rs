//! dyemind-llm — Generative-text backend abstraction.
//! Implements the LlmBackend trait used by the summarizer, the fusion
//! synthesizer and the query assistant.

pub mod backend;

pub use backend::{
    HuggingFaceBackend, LlmBackend, LlmError, LlmRequest, LlmResponse, Message,
    OpenAiCompatibleBackend,
};
