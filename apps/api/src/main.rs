mod caption;
mod config;
mod errors;
mod llm_client;
mod rate_limit;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::caption::template;
use crate::config::Config;
use crate::llm_client::{CompletionClient, OpenAiClient};
use crate::rate_limit::RateLimiter;
use crate::routes::build_router;
use crate::state::AppState;

/// JSON bodies larger than this are rejected before any handler runs.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Caption API v{}", env!("CARGO_PKG_VERSION"));

    // Resolve the active caption template (fails fast on an unknown version
    // or out-of-range sampling parameters)
    let template = Arc::new(template::resolve(&config.caption_template)?);
    info!(
        "Active caption template: {} (max_tokens={}, temperature={})",
        template.version_id, template.sampling.max_tokens, template.sampling.temperature
    );

    // Initialize the /caption rate limiter
    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit_window,
        config.rate_limit_max,
    ));
    info!(
        "Rate limit: {} requests per {:?} per identity",
        config.rate_limit_max, config.rate_limit_window
    );

    // Initialize the completion client
    let completions: Arc<dyn CompletionClient> = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.upstream_timeout,
    ));
    info!("Completion client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        completions,
        template,
        rate_limiter,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // TODO: tighten CORS in production
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
