//! Question banks generated by a language model.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{info, instrument};

use crate::config::GameConfig;
use crate::model::QuestionBank;
use crate::parser::parse_completion;
use crate::traits::{CompletionRequest, LlmProvider, QuestionSource, DEFAULT_SYSTEM_PROMPT};

/// Answers requested per question; the ones past the scored slots feed the
/// opponent's decoy list.
pub const ANSWERS_PER_QUESTION: usize = 10;

/// Settings for [`LlmQuestionSource`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Sampling temperature; high values give more varied questions.
    pub temperature: f64,
    /// Maximum tokens for the reply.
    pub max_tokens: u32,
    /// Longest question the model should write, in characters.
    pub max_prompt_chars: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.9,
            max_tokens: 1024,
            max_prompt_chars: 60,
        }
    }
}

/// [`QuestionSource`] that asks an [`LlmProvider`] to invent the questions.
pub struct LlmQuestionSource {
    provider: Arc<dyn LlmProvider>,
    generator: GeneratorConfig,
    game: GameConfig,
    name: String,
}

impl LlmQuestionSource {
    pub fn new(provider: Arc<dyn LlmProvider>, generator: GeneratorConfig, game: GameConfig) -> Self {
        let name = format!("llm:{}", provider.name());
        Self {
            provider,
            generator,
            game,
            name,
        }
    }

    /// The user message sent to the model.
    pub fn build_prompt(&self, theme: Option<&str>) -> String {
        let questions = self.game.questions_per_session;
        let slots = self.game.slots_per_question;
        let theme_clause = theme
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!(" related to the theme {t}"))
            .unwrap_or_default();
        let headers = (1..=questions)
            .map(|i| format!("'Question {i}: '"))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "Create {questions} questions for playing the 'Guess Their Answer' game{theme_clause}, \
             each question has {ANSWERS_PER_QUESTION} answers with the first {slots} answers being the most popular ones. \
             Restrict your question to at most {} characters long. \
             Do not use any text formatting in your response, \
             In the answers, do not include any numbers or symbols. \
             Use {headers} to indicate each question, \
             then use a numbered list for the answers. \
             Assign a total of {} points to the first {slots} answers, put them in a bracket after each answer, \
             do not include anything else in the brackets",
            self.generator.max_prompt_chars, self.game.points_total,
        )
    }
}

#[async_trait]
impl QuestionSource for LlmQuestionSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(provider = %self.provider.name(), model = %self.generator.model))]
    async fn fetch(&self, theme: Option<&str>) -> anyhow::Result<QuestionBank> {
        let request = CompletionRequest {
            model: self.generator.model.clone(),
            prompt: self.build_prompt(theme),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            max_tokens: self.generator.max_tokens,
            temperature: self.generator.temperature,
        };

        let completion = self.provider.complete(&request).await?;
        info!(
            latency_ms = completion.latency_ms,
            tokens = completion.token_usage.total_tokens,
            "questions generated"
        );
        let bank = parse_completion(&completion.content, self.game.slots_per_question)
            .and_then(|bank| bank.validate(&self.game).map(|()| bank))
            .context("provider reply is not a question bank")?;
        Ok(bank)
    }
}
