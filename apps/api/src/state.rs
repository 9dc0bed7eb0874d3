use std::sync::Arc;

use crate::config::Config;
use crate::documents::store::DocumentStore;
use crate::llm_client::TextGenerator;
use crate::tailoring::prompts::PromptComposer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable generator. `LlmClient` in production, canned replies in tests.
    pub generator: Arc<dyn TextGenerator>,
    /// Generated documents, keyed by session. Scope is `config.session_scope`.
    pub store: Arc<dyn DocumentStore>,
    pub composer: PromptComposer,
    pub config: Config,
}
