//! Shared application state for the web server.

use std::sync::Arc;

use dyemind_core::{CoreConfig, Orchestrator, QueryAssistant};

/// Shared state injected into every Axum handler. The orchestrator and the
/// assistant hold no per-request state, so one instance serves all requests.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub assistant: QueryAssistant,
}

impl AppState {
    pub fn from_config(config: &CoreConfig) -> anyhow::Result<Self> {
        let orchestrator = Orchestrator::from_config(config)?;
        let assistant = QueryAssistant::new(
            dyemind_core::build_backend(config)?,
            Some(config.answer_model.clone()),
        );
        Ok(Self {
            orchestrator,
            assistant,
        })
    }
}

pub type SharedState = Arc<AppState>;
