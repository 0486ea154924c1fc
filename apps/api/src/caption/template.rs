//! Versioned caption-style templates and the prompt builder.
//!
//! A template is the fixed system/user instruction pair plus the sampling
//! parameters that define one caption style. Exactly one template is active
//! per deployment, resolved once at startup from `CAPTION_TEMPLATE`;
//! everything downstream treats it as read-only.
//!
//! All stylistic constraints (length bound, tone, hashtag/emoji policy) live
//! in the instruction text and are enforced by the model, not re-checked
//! after generation.

use thiserror::Error;

use crate::caption::prompts;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unknown caption template '{requested}' (known versions: {known})")]
    UnknownVersion { requested: String, known: String },

    #[error("caption template '{version}' has invalid sampling: {reason}")]
    InvalidSampling {
        version: &'static str,
        reason: &'static str,
    },
}

/// Decoding controls forwarded verbatim to the completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Serialized on the wire only when set.
    pub top_p: Option<f32>,
}

impl SamplingParams {
    fn check(&self, version: &'static str) -> Result<(), TemplateError> {
        if self.max_tokens == 0 {
            return Err(TemplateError::InvalidSampling {
                version,
                reason: "max_tokens must be positive",
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(TemplateError::InvalidSampling {
                version,
                reason: "temperature must be within [0, 2]",
            });
        }
        if let Some(top_p) = self.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(TemplateError::InvalidSampling {
                    version,
                    reason: "top_p must be within [0, 1]",
                });
            }
        }
        Ok(())
    }
}

/// One caption style: instruction pair plus sampling parameters.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub version_id: &'static str,
    pub system_text: &'static str,
    user_wrapper: fn(&str) -> String,
    pub sampling: SamplingParams,
}

/// The system/user message pair sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePair {
    pub system: String,
    pub user: String,
}

impl PromptTemplate {
    /// Renders validated user text into the message pair sent upstream.
    /// The text arrives already trimmed by validation and is not mutated
    /// further here.
    pub fn build(&self, user_text: &str) -> MessagePair {
        MessagePair {
            system: self.system_text.to_string(),
            user: (self.user_wrapper)(user_text),
        }
    }
}

pub const DEFAULT_VERSION: &str = "witty-v1";

/// v1 sends the user's description through untouched.
fn passthrough(user_text: &str) -> String {
    user_text.to_string()
}

/// v2 labels the description so the model stops answering questions posed
/// inside it instead of captioning them.
fn labeled_description(user_text: &str) -> String {
    format!("Description: {user_text}")
}

const TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        version_id: "witty-v1",
        system_text: prompts::WITTY_V1_SYSTEM,
        user_wrapper: passthrough,
        sampling: SamplingParams {
            max_tokens: 30, // keeps it short
            temperature: 0.8,
            top_p: None,
        },
    },
    PromptTemplate {
        version_id: "witty-v2",
        system_text: prompts::WITTY_V2_SYSTEM,
        user_wrapper: labeled_description,
        sampling: SamplingParams {
            max_tokens: 30,
            temperature: 0.8,
            top_p: Some(0.9),
        },
    },
];

/// Looks up a template by version id and checks its sampling invariants.
/// Called once at startup; an unknown version or bad sampling aborts boot.
pub fn resolve(version_id: &str) -> Result<PromptTemplate, TemplateError> {
    let template = TEMPLATES
        .iter()
        .find(|t| t.version_id == version_id)
        .ok_or_else(|| TemplateError::UnknownVersion {
            requested: version_id.to_string(),
            known: TEMPLATES
                .iter()
                .map(|t| t.version_id)
                .collect::<Vec<_>>()
                .join(", "),
        })?;

    template.sampling.check(template.version_id)?;
    Ok(template.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_version_resolves() {
        let template = resolve(DEFAULT_VERSION).unwrap();
        assert_eq!(template.version_id, "witty-v1");
        assert_eq!(template.sampling.max_tokens, 30);
        assert_eq!(template.sampling.top_p, None);
    }

    #[test]
    fn test_unknown_version_is_rejected_and_lists_known() {
        let err = resolve("brooding-v9").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("brooding-v9"));
        assert!(message.contains("witty-v1"));
        assert!(message.contains("witty-v2"));
    }

    #[test]
    fn test_all_registered_templates_have_valid_sampling() {
        for template in TEMPLATES {
            assert!(
                resolve(template.version_id).is_ok(),
                "template {} failed its sampling check",
                template.version_id
            );
        }
    }

    #[test]
    fn test_sampling_invariants() {
        let base = SamplingParams {
            max_tokens: 30,
            temperature: 0.8,
            top_p: None,
        };
        assert!(base.check("t").is_ok());
        assert!(SamplingParams { max_tokens: 0, ..base }.check("t").is_err());
        assert!(SamplingParams { temperature: 2.5, ..base }.check("t").is_err());
        assert!(SamplingParams { temperature: -0.1, ..base }.check("t").is_err());
        assert!(SamplingParams { top_p: Some(1.2), ..base }.check("t").is_err());
        assert!(SamplingParams { top_p: Some(1.0), ..base }.check("t").is_ok());
    }

    #[test]
    fn test_build_passes_text_through_for_v1() {
        let template = resolve("witty-v1").unwrap();
        let pair = template.build("our Sunday service");
        assert_eq!(pair.system, prompts::WITTY_V1_SYSTEM);
        assert_eq!(pair.user, "our Sunday service");
    }

    #[test]
    fn test_build_wraps_text_for_v2() {
        let template = resolve("witty-v2").unwrap();
        let pair = template.build("beach day");
        assert_eq!(pair.user, "Description: beach day");
    }
}
