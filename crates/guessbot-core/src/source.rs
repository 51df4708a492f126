//! Question sources that need no model: a fixed bank or a bank file.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

use crate::model::QuestionBank;
use crate::parser::parse_bank_str;
use crate::traits::QuestionSource;

/// Serves the same in-memory bank to every session.
pub struct StaticQuestionSource {
    bank: QuestionBank,
}

impl StaticQuestionSource {
    pub fn new(bank: QuestionBank) -> Self {
        Self { bank }
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, _theme: Option<&str>) -> anyhow::Result<QuestionBank> {
        Ok(self.bank.clone())
    }
}

/// Reads a TOML/JSON bank file at every session start, so edits show up in
/// the next game. The theme is ignored.
pub struct FileQuestionSource {
    path: PathBuf,
}

impl FileQuestionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for FileQuestionSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, _theme: Option<&str>) -> anyhow::Result<QuestionBank> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read bank file: {}", self.path.display()))?;
        parse_bank_str(&content, &self.path)
    }
}
