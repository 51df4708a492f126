//! Retry wrapper for question sources.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use guessbot_core::model::QuestionBank;
use guessbot_core::traits::QuestionSource;

use crate::error::ProviderError;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Re-runs a failed fetch with exponential backoff.
///
/// Permanent provider errors (bad key, unknown model) are returned at once.
/// A rate-limit hint from the provider replaces the current delay, still
/// capped at one minute. Malformed
/// replies are retried too, since a fresh sample may parse.
pub struct RetryingSource {
    inner: Arc<dyn QuestionSource>,
    max_retries: u32,
    initial_delay: Duration,
}

impl RetryingSource {
    pub fn new(inner: Arc<dyn QuestionSource>, max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            initial_delay,
        }
    }
}

#[async_trait]
impl QuestionSource for RetryingSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, theme: Option<&str>) -> anyhow::Result<QuestionBank> {
        let mut retry_delay = self.initial_delay;
        let mut attempt = 0;
        loop {
            let err = match self.inner.fetch(theme).await {
                Ok(bank) => return Ok(bank),
                Err(err) => err,
            };
            let provider_err = err.downcast_ref::<ProviderError>();
            if provider_err.is_some_and(ProviderError::is_permanent) || attempt >= self.max_retries
            {
                return Err(err);
            }
            if let Some(ms) = provider_err.and_then(ProviderError::retry_after_ms) {
                retry_delay = Duration::from_millis(ms).min(MAX_RETRY_DELAY);
            }
            attempt += 1;
            warn!(
                source = self.inner.name(),
                attempt,
                max_retries = self.max_retries,
                delay_ms = retry_delay.as_millis() as u64,
                "fetching questions failed, retrying: {err:#}"
            );
            tokio::time::sleep(retry_delay).await;
            retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;
    use guessbot_core::config::GameConfig;
    use guessbot_core::error::BankError;
    use guessbot_core::generator::{GeneratorConfig, LlmQuestionSource};

    fn retrying(provider: Arc<MockProvider>, max_retries: u32) -> RetryingSource {
        let source = LlmQuestionSource::new(
            provider,
            GeneratorConfig::default(),
            GameConfig::default(),
        );
        RetryingSource::new(Arc::new(source), max_retries, Duration::from_millis(10))
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried() {
        let provider = Arc::new(MockProvider::scripted([
            Err(ProviderError::Timeout(120)),
            Ok("not a bank".to_string()),
        ]));
        let source = retrying(provider.clone(), 3);

        let bank = source.fetch(Some("pets")).await.unwrap();
        assert_eq!(bank.len(), 3);
        assert_eq!(provider.call_count(), 3);
        assert_eq!(source.name(), "llm:mock");
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_fail_immediately() {
        let provider = Arc::new(MockProvider::scripted([Err(
            ProviderError::AuthenticationFailed("bad key".into()),
        )]));
        let source = retrying(provider.clone(), 3);

        let err = source.fetch(None).await.unwrap_err();
        assert!(err.to_string().contains("authentication failed"));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries_with_last_error() {
        let provider = Arc::new(MockProvider::with_fixed_response("Sorry, no."));
        let source = retrying(provider.clone(), 2);

        let err = source.fetch(None).await.unwrap_err();
        assert_eq!(provider.call_count(), 3);
        assert!(matches!(
            err.downcast_ref::<BankError>(),
            Some(BankError::Unparsable(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_hint_sets_the_delay() {
        let provider = Arc::new(MockProvider::scripted([Err(ProviderError::RateLimited {
            retry_after_ms: 5_000,
        })]));
        let source = retrying(provider.clone(), 1);

        let start = tokio::time::Instant::now();
        source.fetch(None).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(5_000));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_hint_is_capped() {
        let provider = Arc::new(MockProvider::scripted([Err(ProviderError::RateLimited {
            retry_after_ms: 3_600_000,
        })]));
        let source = retrying(provider.clone(), 1);

        let start = tokio::time::Instant::now();
        source.fetch(None).await.unwrap();
        assert!(start.elapsed() <= MAX_RETRY_DELAY);
        assert_eq!(provider.call_count(), 2);
    }
}
