//! Response formatting — normalizes a generation outcome into the response
//! envelope. Success text is trimmed; failures carry their detail into
//! `AppError`, where it is logged and replaced by the generic client message.

use serde::Serialize;

use crate::errors::AppError;
use crate::llm_client::GenerationOutcome;

/// Success envelope for `POST /caption`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptionResponse {
    pub caption: String,
}

pub fn format(outcome: GenerationOutcome) -> Result<CaptionResponse, AppError> {
    match outcome {
        GenerationOutcome::Success(text) => Ok(CaptionResponse {
            caption: text.trim().to_string(),
        }),
        GenerationOutcome::UpstreamError(detail) => Err(AppError::Upstream(detail)),
        GenerationOutcome::Timeout => Err(AppError::UpstreamTimeout),
    }
}
