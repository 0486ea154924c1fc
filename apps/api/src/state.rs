use std::sync::Arc;

use crate::caption::template::PromptTemplate;
use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable completion backend. Default: OpenAiClient. Tests swap in fakes.
    pub completions: Arc<dyn CompletionClient>,
    /// Active caption template — resolved once at startup, read-only afterwards.
    pub template: Arc<PromptTemplate>,
    /// Fixed-window limiter for /caption. The only mutable shared state.
    pub rate_limiter: Arc<RateLimiter>,
    pub config: Config,
}
