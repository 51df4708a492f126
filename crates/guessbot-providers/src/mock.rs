//! Mock provider for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use guessbot_core::traits::{Completion, CompletionRequest, LlmProvider, ModelInfo, TokenUsage};

use crate::error::ProviderError;

/// A well-formed three-question reply in the format the generator asks for.
pub const SAMPLE_REPLY: &str = "\
Question 1: Name a pet people keep at home
1. Dog (40)
2. Cat (25)
3. Fish (15)
4. Bird (10)
5. Hamster (5)
6. Rabbit (5)
7. Turtle
8. Snake
9. Lizard
10. Ferret

Question 2: Name a fruit you eat for breakfast
1. Banana (30)
2. Apple (25)
3. Orange (20)
4. Strawberry (10)
5. Blueberry (10)
6. Grapefruit (5)
7. Mango
8. Kiwi
9. Peach
10. Melon

Question 3: Name something you take to the beach
1. Towel (35)
2. Sunscreen (25)
3. Umbrella (15)
4. Sunglasses (10)
5. Water (10)
6. Book (5)
7. Hat
8. Chair
9. Ball
10. Snacks
";

/// A scripted LLM provider for exercising question generation without real
/// API calls.
///
/// Replies are served from a queue; once it runs dry every call returns the
/// fallback reply.
pub struct MockProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: String,
    call_count: AtomicU32,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockProvider {
    /// Always answer with [`SAMPLE_REPLY`].
    pub fn new() -> Self {
        Self::with_fixed_response(SAMPLE_REPLY)
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: response.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Serve `script` in order, then fall back to [`SAMPLE_REPLY`].
    pub fn scripted(script: impl IntoIterator<Item = Result<String, ProviderError>>) -> Self {
        let mock = Self::new();
        *mock.script.lock().unwrap() = script.into_iter().collect();
        mock
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        let content = match next {
            Some(Ok(reply)) => reply,
            Some(Err(err)) => return Err(err.into()),
            None => self.fallback.clone(),
        };

        let prompt_tokens = (request.prompt.len() / 4) as u32; // Rough estimate
        let completion_tokens = (content.len() / 4) as u32;

        Ok(Completion {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}
