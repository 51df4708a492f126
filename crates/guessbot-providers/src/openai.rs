//! OpenAI and Azure OpenAI chat-completion providers.
//!
//! Both speak the same request/response shape; they differ in URL layout and
//! how the key is sent.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use guessbot_core::traits::{
    Completion, CompletionRequest, LlmProvider, ModelInfo, TokenUsage, DEFAULT_SYSTEM_PROMPT,
};

use crate::error::{check_status, send_error, ProviderError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// API version used when an Azure config names none.
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";

#[derive(Debug, Clone)]
enum Endpoint {
    OpenAi {
        base_url: String,
        org_id: Option<String>,
    },
    Azure {
        endpoint: String,
        deployment: String,
        api_version: String,
    },
}

/// OpenAI-compatible API provider.
pub struct OpenAiProvider {
    api_key: String,
    endpoint: Endpoint,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, base_url: Option<String>, org_id: Option<String>) -> Self {
        Self::with_endpoint(
            api_key,
            Endpoint::OpenAi {
                base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                org_id,
            },
        )
    }

    /// An Azure OpenAI deployment, e.g. `https://my-resource.openai.azure.com`.
    pub fn azure(
        api_key: &str,
        endpoint: &str,
        deployment: &str,
        api_version: Option<String>,
    ) -> Self {
        Self::with_endpoint(
            api_key,
            Endpoint::Azure {
                endpoint: endpoint.trim_end_matches('/').to_string(),
                deployment: deployment.to_string(),
                api_version: api_version.unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
            },
        )
    }

    fn with_endpoint(api_key: &str, endpoint: Endpoint) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            endpoint,
            client,
        }
    }

    fn request_builder(&self) -> reqwest::RequestBuilder {
        match &self.endpoint {
            Endpoint::OpenAi { base_url, org_id } => {
                let mut req = self
                    .client
                    .post(format!("{base_url}/v1/chat/completions"))
                    .header("Authorization", format!("Bearer {}", self.api_key));
                if let Some(org) = org_id {
                    req = req.header("OpenAI-Organization", org);
                }
                req
            }
            Endpoint::Azure {
                endpoint,
                deployment,
                api_version,
            } => self
                .client
                .post(format!(
                    "{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={api_version}"
                ))
                .header("api-key", &self.api_key),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: ChatUsage,
    #[serde(default)]
    model: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        match self.endpoint {
            Endpoint::OpenAi { .. } => "openai",
            Endpoint::Azure { .. } => "azure",
        }
    }

    #[instrument(skip(self, request), fields(provider = self.name(), model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion> {
        let start = Instant::now();

        let system_prompt = request
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let body = ChatRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt.clone(),
                },
            ],
        };

        let response = self
            .request_builder()
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, DEFAULT_TIMEOUT_SECS))?;
        let response = check_status(response, &request.model).await?;

        let api_response: ChatResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::EmptyCompletion)?;
        debug!(latency_ms, chars = content.len(), "completion received");

        let model = if api_response.model.is_empty() {
            request.model.clone()
        } else {
            api_response.model
        };

        Ok(Completion {
            content,
            model,
            token_usage: TokenUsage {
                prompt_tokens: api_response.usage.prompt_tokens,
                completion_tokens: api_response.usage.completion_tokens,
                total_tokens: api_response.usage.total_tokens,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        match &self.endpoint {
            Endpoint::Azure { deployment, .. } => vec![ModelInfo {
                id: deployment.clone(),
                name: format!("Azure deployment {deployment}"),
                provider: "azure".into(),
                max_context: 128_000,
            }],
            Endpoint::OpenAi { .. } => vec![
                ModelInfo {
                    id: "gpt-4o".into(),
                    name: "GPT-4o".into(),
                    provider: "openai".into(),
                    max_context: 128_000,
                },
                ModelInfo {
                    id: "gpt-4o-mini".into(),
                    name: "GPT-4o Mini".into(),
                    provider: "openai".into(),
                    max_context: 128_000,
                },
                ModelInfo {
                    id: "gpt-4.1".into(),
                    name: "GPT-4.1".into(),
                    provider: "openai".into(),
                    max_context: 1_000_000,
                },
            ],
        }
    }
}
