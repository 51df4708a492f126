//! Ollama (local LLM) provider implementation.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use guessbot_core::traits::{
    Completion, CompletionRequest, LlmProvider, ModelInfo, TokenUsage, DEFAULT_SYSTEM_PROMPT,
};

use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 300; // Local models are slower

/// Ollama local LLM provider.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: &str) -> Self {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn unreachable(&self) -> ProviderError {
        ProviderError::NetworkError(format!(
            "Ollama not reachable at {}. Is it running? Start with: ollama serve",
            self.base_url
        ))
    }

    /// Ask the running Ollama instance which models it has pulled.
    pub async fn list_models_async(&self) -> anyhow::Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|_| self.unreachable())?;

        let tags: TagsResponse = response.json().await.map_err(|e| ProviderError::ApiError {
            status: 0,
            message: format!("failed to parse tags response: {e}"),
        })?;

        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
                provider: "ollama".into(),
                max_context: 0,
            })
            .collect())
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
    model: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion> {
        let start = Instant::now();

        let system_prompt = request
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let body = ChatRequest {
            model: request.model.clone(),
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
            stream: false,
            options: ChatOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else if e.is_connect() {
                    self.unreachable()
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(ProviderError::ModelNotFound(format!(
                "Model '{}' not found locally. Pull it with: ollama pull {}",
                request.model, request.model
            ))
            .into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let api_response: ChatResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let content = api_response.message.content;
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion.into());
        }

        let prompt_tokens = api_response.prompt_eval_count.unwrap_or(0);
        let completion_tokens = api_response.eval_count.unwrap_or(0);

        Ok(Completion {
            content,
            model: api_response.model,
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        // Needs a live instance; the CLI calls `list_models_async` instead.
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.into(),
            prompt: "Create 3 questions".into(),
            system_prompt: None,
            max_tokens: 512,
            temperature: 0.9,
        }
    }

    #[tokio::test]
    async fn successful_completion() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "message": {"role": "assistant", "content": "Question 1: Name a pet"},
            "model": "llama3.1:8b",
            "prompt_eval_count": 30,
            "eval_count": 15
        });

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "stream": false,
                "options": {"num_predict": 512}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri());
        let completion = provider.complete(&request("llama3.1:8b")).await.unwrap();
        assert_eq!(completion.content, "Question 1: Name a pet");
        assert_eq!(completion.token_usage.total_tokens, 45);
    }

    #[tokio::test]
    async fn model_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri());
        let err = provider.complete(&request("nonexistent")).await.unwrap_err();
        assert!(err.to_string().contains("ollama pull nonexistent"));
    }

    #[tokio::test]
    async fn dynamic_model_listing() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "models": [
                {"name": "llama3.1:8b", "size": 4_900_000_000_u64},
                {"name": "mistral:7b", "size": 4_100_000_000_u64}
            ]
        });

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri());
        let models = provider.list_models_async().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, "llama3.1:8b");
    }
}
