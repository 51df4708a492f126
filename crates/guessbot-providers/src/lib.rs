//! guessbot-providers — LLM clients, configuration and retries for question generation.
//!
//! Implements the `LlmProvider` trait for OpenAI, Azure OpenAI, Anthropic and
//! Ollama, and loads the `guessbot.toml` configuration that selects between
//! them, plus a retrying wrapper for question sources.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod retry;

pub use config::{create_provider, load_config, load_config_from, GuessbotConfig, ProviderConfig};
pub use error::ProviderError;
pub use retry::RetryingSource;
