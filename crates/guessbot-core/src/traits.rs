//! Core trait definitions for LLM providers and question sources.
//!
//! `LlmProvider` is implemented by the `guessbot-providers` crate;
//! `QuestionSource` is what a [`Session`](crate::session::Session) asks for a
//! fresh bank at the start of every game.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::QuestionBank;

// ---------------------------------------------------------------------------
// LLM Provider trait
// ---------------------------------------------------------------------------

/// Trait for chat-completion backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Send one system + user exchange and return the reply text.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion>;

    /// List models this provider is known to serve.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// A single chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "gpt-4o").
    pub model: String,
    /// The user message.
    pub prompt: String,
    /// System message; providers fall back to [`DEFAULT_SYSTEM_PROMPT`].
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Reply to a [`CompletionRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The reply text.
    pub content: String,
    /// Model that actually answered.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}

/// Default system prompt for question generation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// ---------------------------------------------------------------------------
// Question source trait
// ---------------------------------------------------------------------------

/// Anything that can hand a session its questions.
///
/// Called once per session start, before round 0; it may be slow. Sources are
/// not required to validate counts against a game config; the session does.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Short name for logs (e.g. "llm:openai", "file").
    fn name(&self) -> &str;

    /// Produce a bank, optionally themed.
    async fn fetch(&self, theme: Option<&str>) -> anyhow::Result<QuestionBank>;
}
