use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::caption::validation::ValidationError;

/// Message shown to a throttled client. Plain text, matching the limiter's
/// route-level behavior.
pub const RATE_LIMIT_MESSAGE: &str =
    "Too many caption requests from this IP, please try again later.";

/// Generic message for any upstream generation failure. Clients cannot
/// distinguish failure subtypes; detail stays in server logs.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to generate caption. Try again later.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Upstream call timed out")]
    UpstreamTimeout,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            AppError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE).into_response()
            }
            AppError::Upstream(detail) => {
                tracing::error!("Upstream error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": UPSTREAM_FAILURE_MESSAGE })),
                )
                    .into_response()
            }
            AppError::UpstreamTimeout => {
                tracing::error!("Upstream call exceeded the configured timeout");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": UPSTREAM_FAILURE_MESSAGE })),
                )
                    .into_response()
            }
        }
    }
}
