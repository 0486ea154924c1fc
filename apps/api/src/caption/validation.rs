//! Request validation for `POST /caption`.
//!
//! Works on the raw JSON value rather than a typed extractor so that an
//! absent or non-string `prompt` maps to this service's own 400 message
//! instead of a framework rejection.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide a non-empty \"prompt\" string.")]
    MissingOrEmpty,
}

/// Extracts the `prompt` field and returns it trimmed.
///
/// Fails when the field is absent, not a string, or trims to empty. Pure —
/// no side effects, no mutation beyond the trim.
pub fn validate(body: &Value) -> Result<String, ValidationError> {
    match body.get("prompt").and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ValidationError::MissingOrEmpty),
    }
}
