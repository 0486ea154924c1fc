/// Completion client — the single point of entry for all upstream
/// generation calls in the Caption API.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// All generation traffic MUST go through this module.
///
/// Model: gpt-3.5-turbo (hardcoded — do not make configurable to prevent drift)
///
/// Failures are classified, never retried here: retry policy belongs to
/// whatever sits in front of the service.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::caption::template::{MessagePair, SamplingParams};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for all caption generation.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gpt-3.5-turbo";

/// Outcome of one generation attempt. The detail string on `UpstreamError`
/// is for server-side diagnostics only — it never reaches clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success(String),
    UpstreamError(String),
    Timeout,
}

/// The completion seam carried in `AppState` as `Arc<dyn CompletionClient>`.
/// Production uses [`OpenAiClient`]; tests substitute scripted fakes without
/// touching the handler or pipeline code.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// One outbound call: exactly one system and one user message, the
    /// template's sampling parameters, first choice's text on success.
    async fn generate(&self, messages: &MessagePair, sampling: SamplingParams)
        -> GenerationOutcome;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// The production completion client. Wraps the OpenAI chat-completions API
/// with outcome classification.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, timeout: std::time::Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn generate(
        &self,
        messages: &MessagePair,
        sampling: SamplingParams,
    ) -> GenerationOutcome {
        let request_body = ChatCompletionRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &messages.system,
                },
                ChatMessage {
                    role: "user",
                    content: &messages.user,
                },
            ],
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
        };

        let response = match self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!("Completion request timed out");
                return GenerationOutcome::Timeout;
            }
            Err(e) => {
                return GenerationOutcome::UpstreamError(format!("transport error: {e}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Surface the provider's own message when the body parses
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Completion API returned {status}: {message}");
            return GenerationOutcome::UpstreamError(format!(
                "provider returned {status}: {message}"
            ));
        }

        let completion: ChatCompletionResponse = match response.json().await {
            Ok(c) => c,
            Err(e) if e.is_timeout() => return GenerationOutcome::Timeout,
            Err(e) => {
                return GenerationOutcome::UpstreamError(format!(
                    "malformed provider response: {e}"
                ));
            }
        };

        match completion.choices.into_iter().next() {
            Some(choice) => {
                debug!(
                    "Completion succeeded: {} chars generated",
                    choice.message.content.len()
                );
                GenerationOutcome::Success(choice.message.content)
            }
            None => GenerationOutcome::UpstreamError("provider returned no choices".to_string()),
        }
    }
}
