//! Caption generation — orchestrates the per-request pipeline.
//!
//! Flow: rate gate → validate → build prompt → upstream completion
//!       (bounded by the configured timeout) → format.
//!
//! The gate and validation run before anything touches the network: a
//! throttled or invalid request never costs an upstream invocation. Steps
//! are strictly sequential; nothing here is retried.

use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::caption::formatter::{format, CaptionResponse};
use crate::caption::template::PromptTemplate;
use crate::caption::validation::validate;
use crate::errors::AppError;
use crate::llm_client::{CompletionClient, GenerationOutcome};
use crate::rate_limit::RateLimiter;

/// Runs the full caption pipeline for one request.
///
/// `identity` is the rate-limit key (see `handlers::client_identity`).
/// The upstream call is wrapped in `tokio::time::timeout` so a stalled
/// provider resolves to a `Timeout` outcome instead of hanging the request.
pub async fn generate_caption(
    limiter: &RateLimiter,
    template: &PromptTemplate,
    completions: &dyn CompletionClient,
    upstream_timeout: Duration,
    identity: &str,
    body: &Value,
) -> Result<CaptionResponse, AppError> {
    if !limiter.allow(identity) {
        warn!("Throttled caption request from {identity}");
        return Err(AppError::RateLimitExceeded);
    }

    let prompt = validate(body)?;

    let messages = template.build(&prompt);
    info!(
        "Generating caption with template {} ({} chars of input)",
        template.version_id,
        prompt.len()
    );

    let outcome = match tokio::time::timeout(
        upstream_timeout,
        completions.generate(&messages, template.sampling),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!("Upstream call exceeded {upstream_timeout:?}, abandoning request");
            GenerationOutcome::Timeout
        }
    };

    format(outcome)
}
