//! Axum route handler for the Caption API.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;

use crate::caption::formatter::CaptionResponse;
use crate::caption::service::generate_caption;
use crate::errors::AppError;
use crate::state::AppState;

/// POST /caption
///
/// Body: `{ "prompt": string }`. Returns `{ "caption": string }` on success.
/// The rate limit applies to this route only. The body arrives as a raw
/// JSON value so validation owns the 400 for a missing/non-string prompt.
pub async fn handle_caption(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(body): Json<Value>,
) -> Result<Json<CaptionResponse>, AppError> {
    let identity = client_identity(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    let response = generate_caption(
        &state.rate_limiter,
        &state.template,
        state.completions.as_ref(),
        state.config.upstream_timeout,
        &identity,
        &body,
    )
    .await?;

    Ok(Json(response))
}

/// Resolves the identity that rate-limit counters are keyed by: the leftmost
/// `X-Forwarded-For` entry when present (the service is expected to run
/// behind a trusted proxy), otherwise the socket peer IP.
fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| {
            peer.map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string())
        })
}
