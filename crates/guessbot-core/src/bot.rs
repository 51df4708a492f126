//! Opponent scheduler.
//!
//! The bot answers on its own clock: at round start it waits a random delay,
//! then on the first tick past that deadline it picks one slot it has not
//! used yet and schedules the next answer. It never looks at what the player
//! did; whether its pick still scores is decided by the round.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::GameConfig;
use crate::dice::Dice;

/// Per-round bot bookkeeping, rebuilt at every round start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotState {
    /// Question this state belongs to.
    pub question_index: usize,
    /// Indices the bot has already said this round.
    pub used: BTreeSet<usize>,
    /// Earliest instant the bot may answer again.
    pub next_answer_due_at: Instant,
    /// How many indices the bot draws from (slots, or the whole guess list).
    pub pool: usize,
}

impl BotState {
    /// Whether every index in the pool has been said.
    pub fn exhausted(&self) -> bool {
        self.used.len() >= self.pool
    }
}

/// The scripted opponent.
#[derive(Debug, Clone)]
pub struct Bot {
    min_delay_secs: u64,
    max_delay_secs: u64,
    state: Option<BotState>,
}

impl Bot {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            min_delay_secs: config.bot_min_delay_secs,
            max_delay_secs: config.bot_max_delay_secs,
            state: None,
        }
    }

    /// Reset for question `question_index`, drawing from `pool` indices.
    pub fn start_question(
        &mut self,
        question_index: usize,
        pool: usize,
        now: Instant,
        dice: &mut dyn Dice,
    ) {
        let delay = self.draw_delay(dice);
        debug!(question = question_index, pool, delay_secs = delay.as_secs(), "bot armed");
        self.state = Some(BotState {
            question_index,
            used: BTreeSet::new(),
            next_answer_due_at: now + delay,
            pool,
        });
    }

    /// Forget the current round; `update` returns `None` until restarted.
    pub fn stop(&mut self) {
        self.state = None;
    }

    /// Answer if the deadline has passed and unused indices remain.
    ///
    /// Returns the chosen index and pushes the deadline to `now` plus a fresh
    /// delay, which is always strictly later than `now`.
    pub fn update(&mut self, now: Instant, dice: &mut dyn Dice) -> Option<usize> {
        let delay = {
            let state = self.state.as_ref()?;
            if state.exhausted() || now < state.next_answer_due_at {
                return None;
            }
            self.draw_delay(dice)
        };
        let state = self.state.as_mut()?;

        let available: Vec<usize> = (0..state.pool).filter(|i| !state.used.contains(i)).collect();
        let choice = available[dice.pick(available.len())];
        state.used.insert(choice);
        state.next_answer_due_at = now + delay;
        debug!(
            question = state.question_index,
            choice,
            next_in_secs = delay.as_secs(),
            "bot answered"
        );
        Some(choice)
    }

    pub fn state(&self) -> Option<&BotState> {
        self.state.as_ref()
    }

    fn draw_delay(&self, dice: &mut dyn Dice) -> Duration {
        Duration::from_secs(dice.delay_secs(self.min_delay_secs, self.max_delay_secs))
    }
}
