//! Anthropic Messages API provider.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use guessbot_core::traits::{
    Completion, CompletionRequest, LlmProvider, ModelInfo, TokenUsage, DEFAULT_SYSTEM_PROMPT,
};

use crate::error::{check_status, send_error, ProviderError};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const API_VERSION: &str = "2023-06-01";

/// Anthropic API provider.
pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Usage,
    model: String,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion> {
        let start = Instant::now();

        // The Messages API caps temperature at 1.0.
        let body = MessagesRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature.min(1.0),
            system: request
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            messages: vec![Message {
                role: "user",
                content: request.prompt.clone(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, DEFAULT_TIMEOUT_SECS))?;
        let response = check_status(response, &request.model).await?;

        let api_response: MessagesResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let content: String = api_response
            .content
            .iter()
            .map(|block| block.text.as_str())
            .collect();
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion.into());
        }
        debug!(latency_ms, chars = content.len(), "completion received");

        let usage = &api_response.usage;
        Ok(Completion {
            content,
            model: api_response.model,
            token_usage: TokenUsage {
                prompt_tokens: usage.input_tokens,
                completion_tokens: usage.output_tokens,
                total_tokens: usage.input_tokens + usage.output_tokens,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "claude-sonnet-4-20250514".into(),
                name: "Claude Sonnet 4".into(),
                provider: "anthropic".into(),
                max_context: 200_000,
            },
            ModelInfo {
                id: "claude-haiku-4-5-20251001".into(),
                name: "Claude Haiku 4.5".into(),
                provider: "anthropic".into(),
                max_context: 200_000,
            },
        ]
    }
}
