//! Core data model: questions and the per-session question bank.
//!
//! A [`Question`] holds index-aligned slots: `canonical[i]`, `display[i]` and
//! `points[i]` all describe slot `i`. A [`QuestionBank`] pairs each question
//! with the list of strings the opponent may say for it. Both are immutable
//! once built.

use std::collections::HashSet;

use crate::config::GameConfig;
use crate::error::BankError;
use crate::matcher::normalize;

/// One prompt with its scored answer slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    canonical: Vec<String>,
    display: Vec<String>,
    points: Vec<u32>,
}

impl Question {
    /// Build a question. Canonical answers are normalized (lowercased, all
    /// whitespace removed); shape checks happen in [`QuestionBank::new`].
    pub fn new(
        prompt: impl Into<String>,
        canonical: Vec<String>,
        display: Vec<String>,
        points: Vec<u32>,
    ) -> Self {
        Self {
            prompt: prompt.into().trim().to_string(),
            canonical: canonical.iter().map(|a| normalize(a)).collect(),
            display,
            points,
        }
    }

    /// Build a question whose canonical answers are derived from the display
    /// text: alphabetic characters only, lowercased.
    pub fn from_display(prompt: impl Into<String>, display: Vec<String>, points: Vec<u32>) -> Self {
        let canonical = display.iter().map(|d| canonical_form(d)).collect();
        Self::new(prompt, canonical, display, points)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Canonical (matchable) answers, one per slot.
    pub fn canonical_answers(&self) -> &[String] {
        &self.canonical
    }

    /// Human-readable answers, one per slot.
    pub fn display_answers(&self) -> &[String] {
        &self.display
    }

    /// Point value of each slot.
    pub fn point_values(&self) -> &[u32] {
        &self.points
    }

    /// Number of scored slots.
    pub fn slot_count(&self) -> usize {
        self.canonical.len()
    }

    /// Points carried by `slot`, or `None` past the scored slots.
    pub fn points_for(&self, slot: usize) -> Option<u32> {
        self.points.get(slot).copied()
    }

    fn check_shape(&self, question: usize) -> Result<(), BankError> {
        if self.prompt.is_empty() {
            return Err(BankError::EmptyPrompt { question });
        }
        if self.canonical.len() != self.display.len() || self.canonical.len() != self.points.len()
        {
            return Err(BankError::Misaligned {
                question,
                canonical: self.canonical.len(),
                display: self.display.len(),
                points: self.points.len(),
            });
        }
        let mut seen = HashSet::new();
        for (slot, answer) in self.canonical.iter().enumerate() {
            if answer.is_empty() {
                return Err(BankError::EmptyAnswer { question, slot });
            }
            if !seen.insert(answer.as_str()) {
                return Err(BankError::DuplicateAnswer {
                    question,
                    answer: answer.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Reduce display text to its canonical form: alphabetic characters only,
/// lowercased. "Golden Retriever" becomes "goldenretriever".
pub fn canonical_form(display: &str) -> String {
    display
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The questions for one session plus what the opponent may say for each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
    guesses: Vec<Vec<String>>,
}

impl QuestionBank {
    /// Build a bank, checking every question's internal shape.
    ///
    /// `guesses[i]` is the opponent list for question `i`; entries past the
    /// scored slots are flavor and never carry points. Counts against a
    /// particular game are checked separately by [`QuestionBank::validate`].
    pub fn new(questions: Vec<Question>, guesses: Vec<Vec<String>>) -> Result<Self, BankError> {
        if guesses.len() != questions.len() {
            return Err(BankError::GuessListCount {
                expected: questions.len(),
                found: guesses.len(),
            });
        }
        for (index, question) in questions.iter().enumerate() {
            question.check_shape(index)?;
        }
        Ok(Self { questions, guesses })
    }

    /// Build a bank whose opponent lists are just the display answers.
    pub fn without_decoys(questions: Vec<Question>) -> Result<Self, BankError> {
        let guesses = questions
            .iter()
            .map(|q| q.display_answers().to_vec())
            .collect();
        Self::new(questions, guesses)
    }

    /// Check question count, slot count and point totals against `config`.
    pub fn validate(&self, config: &GameConfig) -> Result<(), BankError> {
        if self.questions.len() != config.questions_per_session {
            return Err(BankError::QuestionCount {
                expected: config.questions_per_session,
                found: self.questions.len(),
            });
        }
        for (question, q) in self.questions.iter().enumerate() {
            if q.slot_count() != config.slots_per_question {
                return Err(BankError::SlotCount {
                    question,
                    expected: config.slots_per_question,
                    found: q.slot_count(),
                });
            }
            // Summed wide so provider-supplied values cannot wrap into range.
            let found: u64 = q.point_values().iter().map(|&p| u64::from(p)).sum();
            if found != u64::from(config.points_total) {
                return Err(BankError::PointsTotal {
                    question,
                    expected: config.points_total,
                    found,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Opponent guess list for question `index` (empty if out of range).
    pub fn guesses(&self, index: usize) -> &[String] {
        self.guesses.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// What the opponent says when it picks `slot` of question `index`:
    /// its guess-list entry, falling back to the slot's display answer.
    pub fn utterance(&self, index: usize, slot: usize) -> Option<&str> {
        self.guesses(index)
            .get(slot)
            .map(String::as_str)
            .or_else(|| {
                self.question(index)
                    .and_then(|q| q.display_answers().get(slot))
                    .map(String::as_str)
            })
    }
}
