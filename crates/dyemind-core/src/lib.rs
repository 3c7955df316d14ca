//! dyemind-core — The multi-source aggregation and fusion pipeline.
//!
//! Dispatches the encyclopedia, structure and literature connectors
//! concurrently, tolerates any subset of them failing, summarizes the
//! surviving literature abstracts and fuses everything into one narrative
//! through a generative-text backend. Every entity lives for exactly one
//! query; there is no cross-request state.

pub mod assistant;
pub mod config;
pub mod fusion;
pub mod orchestrator;
pub mod summarizer;

pub use assistant::{QueryAssistant, ANSWER_UNAVAILABLE};
pub use config::{build_backend, CoreConfig};
pub use fusion::{FusionSynthesizer, FUSION_FAILED};
pub use orchestrator::{
    CompoundReport, LiteratureInsight, Orchestrator, SourceTags, INSUFFICIENT_DATA,
};
pub use summarizer::{AbstractSummarizer, SUMMARY_UNAVAILABLE};
