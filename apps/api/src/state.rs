use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::session::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. `LlmClient` in production, a canned client in tests.
    pub llm: Arc<dyn CompletionClient>,
    pub sessions: SessionRegistry,
    pub config: Config,
}
