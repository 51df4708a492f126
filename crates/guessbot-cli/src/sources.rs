//! Turning command-line flags and config into a question source.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use guessbot_core::generator::LlmQuestionSource;
use guessbot_core::source::FileQuestionSource;
use guessbot_core::traits::QuestionSource;
use guessbot_providers::{create_provider, GuessbotConfig, RetryingSource};

use crate::SourceArgs;

/// A model-backed source, retried with backoff per the config.
pub fn llm_source(args: &SourceArgs, config: &GuessbotConfig) -> Result<Arc<dyn QuestionSource>> {
    let provider_name = args
        .provider
        .as_deref()
        .unwrap_or(&config.default_provider);
    let provider = create_provider(provider_name, config.provider(provider_name)?)?;

    let mut generator = config.generator();
    if let Some(model) = &args.model {
        generator.model = model.clone();
    }
    tracing::debug!(provider = provider_name, model = %generator.model, "using LLM question source");

    let source = LlmQuestionSource::new(Arc::from(provider), generator, config.game.clone());
    Ok(Arc::new(RetryingSource::new(
        Arc::new(source),
        config.max_retries,
        Duration::from_millis(config.retry_delay_ms),
    )))
}

/// A bank file when one is given, otherwise the configured model.
pub fn play_source(
    args: &SourceArgs,
    bank: Option<&Path>,
    config: &GuessbotConfig,
) -> Result<Arc<dyn QuestionSource>> {
    match bank {
        Some(path) => {
            anyhow::ensure!(path.exists(), "bank file not found: {}", path.display());
            Ok(Arc::new(FileQuestionSource::new(path)))
        }
        None => llm_source(args, config),
    }
}
