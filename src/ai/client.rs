//! LLM (`OpenAI` Responses API) backed capability provider.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

use super::prompt::{
    build_detect_prompt, build_summarize_prompt, build_translate_prompt, estimate_tokens,
};
use super::{CapabilityProvider, Detection, SummaryText, TranslatedText};
use crate::core::config::AppConfig;
use crate::errors::LingoError;

/// Output ceilings per capability. Detection only needs a couple of tokens.
const DETECT_MAX_OUTPUT_TOKENS: usize = 16;
const TRANSLATE_MAX_OUTPUT_TOKENS: usize = 8_000;
const SUMMARIZE_MAX_OUTPUT_TOKENS: usize = 1_000;

#[derive(Debug, Clone, Copy)]
enum Capability {
    Detect,
    Translate,
    Summarize,
}

impl Capability {
    const fn label(self) -> &'static str {
        match self {
            Self::Detect => "language detector",
            Self::Translate => "translator",
            Self::Summarize => "summarizer",
        }
    }
}

pub struct LlmProvider {
    http: Client,
    api_base: String,
    model_name: String,
    org_id: Option<String>,
    translator_token: Option<String>,
    summarizer_token: Option<String>,
    language_token: Option<String>,
}

impl std::fmt::Debug for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmProvider")
            .field("api_base", &self.api_base)
            .field("model_name", &self.model_name)
            .field("has_translator_token", &self.translator_token.is_some())
            .field("has_summarizer_token", &self.summarizer_token.is_some())
            .field("has_language_token", &self.language_token.is_some())
            .finish_non_exhaustive()
    }
}

impl LlmProvider {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, LingoError> {
        // Timeouts are owned by the controller so it can report them per entry.
        let http = Client::builder()
            .build()
            .map_err(|e| LingoError::HttpError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            model_name: config.openai_model.clone(),
            org_id: config.openai_org_id.clone(),
            translator_token: config.translator_token.clone(),
            summarizer_token: config.summarizer_token.clone(),
            language_token: config.language_token.clone(),
        })
    }

    fn token_for(&self, capability: Capability) -> Result<&str, LingoError> {
        let token = match capability {
            Capability::Detect => self.language_token.as_deref(),
            Capability::Translate => self.translator_token.as_deref(),
            Capability::Summarize => self.summarizer_token.as_deref(),
        };
        token.ok_or_else(|| {
            LingoError::CapabilityUnavailable(format!(
                "no {} token configured",
                capability.label()
            ))
        })
    }

    async fn complete(
        &self,
        capability: Capability,
        prompt: Vec<ChatCompletionMessage>,
        max_output_tokens: usize,
    ) -> Result<String, LingoError> {
        let token = self.token_for(capability)?;

        #[cfg(feature = "debug-logs")]
        info!("Using {} prompt:\n{:?}", capability.label(), prompt);

        let estimated_input_tokens = prompt
            .iter()
            .map(|msg| estimate_tokens(&format!("{:?}", msg.content)))
            .sum::<usize>();
        info!(
            capability = capability.label(),
            estimated_input_tokens, "Calling AI provider"
        );

        let request_body = json!({
            "model": self.model_name,
            "input": build_responses_input_from_prompt(&prompt),
            "max_output_tokens": max_output_tokens
        });

        let mut request = self
            .http
            .post(format!("{}/responses", self.api_base))
            .bearer_auth(token)
            .json(&request_body);
        if let Some(org) = &self.org_id {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LingoError::ServiceError(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(LingoError::ServiceError(format!(
                "OpenAI API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            LingoError::ServiceError(format!("Failed to parse OpenAI response: {e}"))
        })?;

        extract_output_text(&response_json)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LingoError::ServiceError("No text in response".to_string()))
    }
}

#[async_trait]
impl CapabilityProvider for LlmProvider {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn detect_language(&self, text: &str) -> Result<Detection, LingoError> {
        let raw = self
            .complete(
                Capability::Detect,
                build_detect_prompt(text),
                DETECT_MAX_OUTPUT_TOKENS,
            )
            .await?;
        Ok(Detection {
            language: raw.trim().to_string(),
        })
    }

    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<TranslatedText, LingoError> {
        let text = self
            .complete(
                Capability::Translate,
                build_translate_prompt(text, source_language, target_language),
                TRANSLATE_MAX_OUTPUT_TOKENS,
            )
            .await?;
        Ok(TranslatedText {
            text: text.trim().to_string(),
        })
    }

    async fn summarize(&self, text: &str, language: &str) -> Result<SummaryText, LingoError> {
        let text = self
            .complete(
                Capability::Summarize,
                build_summarize_prompt(text, language),
                SUMMARIZE_MAX_OUTPUT_TOKENS,
            )
            .await?;
        Ok(SummaryText {
            text: text.trim().to_string(),
        })
    }
}

/// Pulls the generated text out of a Responses API payload, preferring the
/// `output_text` convenience field and falling back to `output[].content[]`.
pub(crate) fn extract_output_text(response_json: &Value) -> Option<String> {
    if let Some(text) = response_json.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let mut collected: Vec<String> = Vec::new();
    let items = response_json.get("output").and_then(Value::as_array)?;
    for item in items {
        let Some(parts) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for p in parts {
            let is_output_text = p
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| t == "output_text");
            if !is_output_text {
                continue;
            }
            if let Some(s) = p.get("text").and_then(Value::as_str) {
                collected.push(s.to_string());
            } else if let Some(s) = p
                .get("text")
                .and_then(|t| t.get("value"))
                .and_then(Value::as_str)
            {
                collected.push(s.to_string());
            }
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected.join("\n"))
    }
}

/// Build Responses API input payload from a chat-style prompt.
/// Assistant messages are dropped and text is emitted as `input_text` parts.
pub(crate) fn build_responses_input_from_prompt(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter(|m| !matches!(m.role, MessageRole::assistant))
        .map(|m| {
            let role_str = match m.role {
                MessageRole::system => "system",
                _ => "user",
            };

            let parts: Vec<Value> = match &m.content {
                Content::Text(t) => vec![json!({ "type": "input_text", "text": t })],
                Content::ImageUrl(_) => Vec::new(),
            };

            json!({
                "role": role_str,
                "content": parts
            })
        })
        .collect()
}
