use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Loaded once at startup; immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub port: u16,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u32,
    pub caption_template: String,
    pub upstream_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            port: env_or("PORT", "3001")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rate_limit_window: Duration::from_secs(
                env_or("RATE_LIMIT_WINDOW_SECS", "900")
                    .parse::<u64>()
                    .context("RATE_LIMIT_WINDOW_SECS must be a number of seconds")?,
            ),
            rate_limit_max: env_or("RATE_LIMIT_MAX", "20")
                .parse::<u32>()
                .context("RATE_LIMIT_MAX must be a positive integer")?,
            caption_template: env_or("CAPTION_TEMPLATE", crate::caption::template::DEFAULT_VERSION),
            upstream_timeout: Duration::from_secs(
                env_or("UPSTREAM_TIMEOUT_SECS", "30")
                    .parse::<u64>()
                    .context("UPSTREAM_TIMEOUT_SECS must be a number of seconds")?,
            ),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
