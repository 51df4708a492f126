//! Game tuning knobs.
//!
//! Every field has a default, so an empty `[game]` table (or none at all)
//! yields the standard three-question, six-slot, twenty-second game.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Rules of a single session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Questions (rounds) per session.
    pub questions_per_session: usize,
    /// Scored answer slots per question.
    pub slots_per_question: usize,
    /// Points shared across a question's slots.
    pub points_total: u32,
    /// Round length in seconds.
    pub round_time_limit_secs: u64,
    /// Shortest wait before the bot answers, in seconds.
    pub bot_min_delay_secs: u64,
    /// Longest wait before the bot answers, in seconds (inclusive).
    pub bot_max_delay_secs: u64,
    /// Minimum similarity for a guess to count as a match.
    pub match_threshold: f64,
    /// Let the bot also draw unscored guesses from the opponent list.
    pub bot_uses_decoys: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            questions_per_session: 3,
            slots_per_question: 6,
            points_total: 100,
            round_time_limit_secs: 20,
            bot_min_delay_secs: 8,
            bot_max_delay_secs: 15,
            match_threshold: crate::matcher::DEFAULT_THRESHOLD,
            bot_uses_decoys: false,
        }
    }
}

impl GameConfig {
    /// Round length as a [`Duration`].
    pub fn round_time_limit(&self) -> Duration {
        Duration::from_secs(self.round_time_limit_secs)
    }

    /// Reject settings the state machine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.questions_per_session == 0 {
            return Err(ConfigError::Zero("questions_per_session"));
        }
        if self.slots_per_question == 0 {
            return Err(ConfigError::Zero("slots_per_question"));
        }
        if self.round_time_limit_secs == 0 {
            return Err(ConfigError::Zero("round_time_limit_secs"));
        }
        if self.bot_min_delay_secs == 0 {
            return Err(ConfigError::ZeroDelay);
        }
        if self.bot_min_delay_secs > self.bot_max_delay_secs {
            return Err(ConfigError::DelayRange {
                min: self.bot_min_delay_secs,
                max: self.bot_max_delay_secs,
            });
        }
        if !(self.match_threshold > 0.0 && self.match_threshold <= 1.0) {
            return Err(ConfigError::Threshold(self.match_threshold));
        }
        Ok(())
    }
}
