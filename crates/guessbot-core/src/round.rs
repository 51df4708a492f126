//! Round state machine.
//!
//! Walks a [`QuestionBank`] one question at a time:
//! `Idle -> Playing(0) -> Playing(1) -> ... -> Scoreboard`. Each round has a
//! fixed time budget measured from its start; player guesses and bot answers
//! claim slots until time runs out, then [`RoundMachine::advance_round`]
//! archives the scores and moves on.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::bot::{Bot, BotState};
use crate::config::GameConfig;
use crate::dice::Dice;
use crate::history::SessionHistory;
use crate::matcher::{match_guess, MatchOutcome};
use crate::model::{Question, QuestionBank};

/// Where the machine is in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// No round started yet.
    Idle,
    /// Playing the question at this index.
    Playing(usize),
    /// All questions done.
    Scoreboard,
}

/// Mutable state of the current round. Rebuilt at every round start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    /// `None` before the first round.
    pub question_index: Option<usize>,
    /// Slots claimed by either side this round.
    pub revealed: Vec<bool>,
    pub started_at: Option<Instant>,
    pub player_score: u32,
    pub opponent_score: u32,
}

impl RoundState {
    fn idle(slots: usize) -> Self {
        Self {
            question_index: None,
            revealed: vec![false; slots],
            started_at: None,
            player_score: 0,
            opponent_score: 0,
        }
    }

    fn fresh(question_index: usize, slots: usize, now: Instant) -> Self {
        Self {
            question_index: Some(question_index),
            revealed: vec![false; slots],
            started_at: Some(now),
            player_score: 0,
            opponent_score: 0,
        }
    }

    /// Slots nobody has claimed yet.
    pub fn remaining(&self) -> usize {
        self.revealed.iter().filter(|r| !**r).count()
    }
}

/// Outcome of a player guess, for the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// New slot claimed; `points` were added to the player's score.
    Correct { slot: usize, points: u32 },
    /// Guess matched a slot someone already claimed.
    RepeatedAnswer { slot: usize },
    /// Guess matched nothing.
    Wrong,
    /// Guess was blank.
    EmptyInput,
}

impl Feedback {
    /// Points awarded by this guess.
    pub fn points(&self) -> u32 {
        match self {
            Feedback::Correct { points, .. } => *points,
            _ => 0,
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Correct { points, .. } => write!(f, "Correct! +{points} points"),
            Feedback::RepeatedAnswer { .. } => write!(f, "Repeated answer!"),
            Feedback::Wrong => write!(f, "Wrong answer!"),
            Feedback::EmptyInput => write!(f, "Please enter an answer!"),
        }
    }
}

/// One thing the bot said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotAnswer {
    /// Question the answer belongs to.
    pub question_index: usize,
    /// Index the bot picked (a slot, or a decoy past the slots).
    pub pick: usize,
    /// Text the bot says.
    pub utterance: String,
    /// Points the opponent gained; `None` if the pick was already revealed
    /// or is a decoy.
    pub points: Option<u32>,
}

/// Drives rounds over one bank.
#[derive(Debug)]
pub struct RoundMachine {
    config: GameConfig,
    bank: Arc<QuestionBank>,
    phase: RoundPhase,
    state: RoundState,
    bot: Bot,
    history: SessionHistory,
}

impl RoundMachine {
    /// A machine in [`RoundPhase::Idle`]. The bank is assumed valid for
    /// `config`.
    pub fn new(bank: Arc<QuestionBank>, config: GameConfig) -> Self {
        let slots = config.slots_per_question;
        Self {
            bot: Bot::new(&config),
            config,
            bank,
            phase: RoundPhase::Idle,
            state: RoundState::idle(slots),
            history: SessionHistory::new(),
        }
    }

    /// Close the current round (if any) and open the next one.
    ///
    /// Archives the round scores into the history unless no round has started
    /// yet, resets scores and reveals, moves to the next question and rearms
    /// the bot. Past the last question the machine enters
    /// [`RoundPhase::Scoreboard`]; further calls do nothing.
    pub fn advance_round(&mut self, now: Instant, dice: &mut dyn Dice) {
        if self.phase == RoundPhase::Scoreboard {
            return;
        }
        if let Some(index) = self.state.question_index {
            self.history
                .record_round(self.state.player_score, self.state.opponent_score);
            info!(
                round = index + 1,
                player = self.state.player_score,
                opponent = self.state.opponent_score,
                "round finished"
            );
        }

        let next = self.state.question_index.map_or(0, |i| i + 1);
        self.state = RoundState::fresh(next, self.config.slots_per_question, now);

        if next >= self.bank.len() {
            self.phase = RoundPhase::Scoreboard;
            self.bot.stop();
            let totals = self.history.totals();
            info!(
                player = totals.player,
                opponent = totals.opponent,
                "all rounds played"
            );
        } else {
            self.phase = RoundPhase::Playing(next);
            let pool = self.bot_pool(next);
            self.bot.start_question(next, pool, now, dice);
            info!(round = next + 1, "round started");
        }
    }

    /// Score a player's guess against the current question.
    ///
    /// Returns `None` outside [`RoundPhase::Playing`].
    pub fn on_player_guess(&mut self, raw: &str) -> Option<Feedback> {
        let RoundPhase::Playing(index) = self.phase else {
            return None;
        };
        let bank = Arc::clone(&self.bank);
        let question = bank.question(index)?;
        let outcome = match_guess(
            raw,
            question.canonical_answers(),
            self.config.match_threshold,
        );

        let feedback = match outcome {
            MatchOutcome::Empty => Feedback::EmptyInput,
            MatchOutcome::NoMatch { .. } => Feedback::Wrong,
            MatchOutcome::Match { slot, .. } if self.state.revealed[slot] => {
                Feedback::RepeatedAnswer { slot }
            }
            MatchOutcome::Match { slot, .. } => {
                let points = question.points_for(slot).unwrap_or(0);
                self.state.revealed[slot] = true;
                self.state.player_score += points;
                Feedback::Correct { slot, points }
            }
        };
        debug!(guess = raw, ?outcome, ?feedback, "player guess");
        Some(feedback)
    }

    /// Advance if the round's time budget is spent. Returns whether it did.
    pub fn on_time_expired(&mut self, now: Instant, dice: &mut dyn Dice) -> bool {
        if !matches!(self.phase, RoundPhase::Playing(_)) {
            return false;
        }
        if self.elapsed(now) >= self.config.round_time_limit() {
            self.advance_round(now, dice);
            return true;
        }
        false
    }

    /// Let the bot answer if it is due, applying any points it earns.
    pub fn on_bot_tick(&mut self, now: Instant, dice: &mut dyn Dice) -> Option<BotAnswer> {
        let RoundPhase::Playing(index) = self.phase else {
            return None;
        };
        let pick = self.bot.update(now, dice)?;

        let points = match self.state.revealed.get(pick) {
            Some(false) => {
                let points = self
                    .bank
                    .question(index)
                    .and_then(|q| q.points_for(pick))
                    .unwrap_or(0);
                self.state.revealed[pick] = true;
                self.state.opponent_score += points;
                Some(points)
            }
            _ => None,
        };
        let utterance = self.bank.utterance(index, pick).unwrap_or_default().to_string();
        Some(BotAnswer {
            question_index: index,
            pick,
            utterance,
            points,
        })
    }

    /// Time since the current round started (zero when no round is running).
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.state
            .started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }

    /// Whole seconds left in the round, counted the way a countdown shows
    /// them: limit minus whole seconds elapsed.
    pub fn time_left_secs(&self, now: Instant) -> u64 {
        self.config
            .round_time_limit_secs
            .saturating_sub(self.elapsed(now).as_secs())
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn bot_state(&self) -> Option<&BotState> {
        self.bot.state()
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn bank(&self) -> &Arc<QuestionBank> {
        &self.bank
    }

    /// The question being played, if any.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            RoundPhase::Playing(index) => self.bank.question(index),
            _ => None,
        }
    }

    fn bot_pool(&self, index: usize) -> usize {
        let slots = self.config.slots_per_question;
        if self.config.bot_uses_decoys {
            self.bank.guesses(index).len().max(slots)
        } else {
            slots
        }
    }
}
