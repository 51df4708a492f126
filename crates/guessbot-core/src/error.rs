//! Error types for the guessbot core.
//!
//! Guess outcomes are never errors; they are [`Feedback`](crate::round::Feedback)
//! values. The types here cover the failures that abort a session start or
//! reject a configuration.

use thiserror::Error;

use crate::session::Phase;

/// A question bank whose shape does not match what a session needs.
///
/// Raised when parsing provider replies, loading bank files, and validating a
/// bank against a [`GameConfig`](crate::config::GameConfig). Question and slot
/// numbers in messages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// The bank does not hold the configured number of questions.
    #[error("expected {expected} questions, found {found}")]
    QuestionCount { expected: usize, found: usize },

    /// A question does not hold the configured number of scored slots.
    #[error("question {}: expected {expected} answer slots, found {found}", .question + 1)]
    SlotCount {
        question: usize,
        expected: usize,
        found: usize,
    },

    /// Canonical answers, display answers and points differ in length.
    #[error(
        "question {}: misaligned slots ({canonical} canonical, {display} display, {points} points)",
        .question + 1
    )]
    Misaligned {
        question: usize,
        canonical: usize,
        display: usize,
        points: usize,
    },

    /// A question has a blank prompt.
    #[error("question {}: empty prompt", .question + 1)]
    EmptyPrompt { question: usize },

    /// A canonical answer normalizes to nothing.
    #[error("question {}: slot {} has an empty answer", .question + 1, .slot + 1)]
    EmptyAnswer { question: usize, slot: usize },

    /// Two slots of one question share a canonical answer.
    #[error("question {}: duplicate answer '{answer}'", .question + 1)]
    DuplicateAnswer { question: usize, answer: String },

    /// Slot points do not add up to the configured total.
    #[error("question {}: points sum to {found}, expected {expected}", .question + 1)]
    PointsTotal {
        question: usize,
        expected: u32,
        found: u64,
    },

    /// The opponent-guess lists do not line up with the questions.
    #[error("expected {expected} opponent guess lists, found {found}")]
    GuessListCount { expected: usize, found: usize },

    /// The raw provider reply or bank file could not be read as a bank at all.
    #[error("unparsable question bank: {0}")]
    Unparsable(String),
}

/// Errors raised by [`Session`](crate::session::Session) lifecycle operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The question source failed to produce a bank.
    #[error("question source failed: {0:#}")]
    Source(#[source] anyhow::Error),

    /// The question source produced a bank of the wrong shape.
    #[error("malformed question bank: {0}")]
    MalformedBank(#[from] BankError),

    /// The operation is only valid from the menu.
    #[error("a session can only start from the menu (current phase: {0})")]
    NotInMenu(Phase),

    /// The operation is only valid on the scoreboard.
    #[error("a session can only restart from the scoreboard (current phase: {0})")]
    NotAtScoreboard(Phase),
}

/// An inconsistent [`GameConfig`](crate::config::GameConfig).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `bot_min_delay_secs` exceeds `bot_max_delay_secs`.
    #[error("bot delay range is empty: min {min}s > max {max}s")]
    DelayRange { min: u64, max: u64 },

    /// A zero bot delay would let the bot answer every tick.
    #[error("bot_min_delay_secs must be at least 1")]
    ZeroDelay,

    /// The match threshold must lie in (0, 1].
    #[error("match_threshold must be in (0, 1], got {0}")]
    Threshold(f64),

    /// A count or limit that must be positive is zero.
    #[error("{0} must be at least 1")]
    Zero(&'static str),
}
