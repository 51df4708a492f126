//! Random sources for the opponent.
//!
//! The bot never calls an ambient RNG; it asks a [`Dice`] for delays and
//! picks. [`SeededDice`] is the real thing, [`ScriptedDice`] replays fixed
//! values so schedules can be asserted exactly.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the bot's random decisions.
pub trait Dice: Send {
    /// A whole number of seconds drawn uniformly from `min..=max`.
    fn delay_secs(&mut self, min: u64, max: u64) -> u64;

    /// An index drawn uniformly from `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// [`Dice`] backed by a standard RNG.
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    /// Seed from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn delay_secs(&mut self, min: u64, max: u64) -> u64 {
        self.rng.gen_range(min..=max)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// [`Dice`] that replays queued values.
///
/// Delays are clamped into the requested range and picks are taken modulo
/// `len`. Once a queue runs dry, delays fall back to `min` and picks to 0.
#[derive(Debug, Default, Clone)]
pub struct ScriptedDice {
    delays: VecDeque<u64>,
    picks: VecDeque<usize>,
}

impl ScriptedDice {
    pub fn new(delays: impl IntoIterator<Item = u64>, picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            delays: delays.into_iter().collect(),
            picks: picks.into_iter().collect(),
        }
    }
}

impl Dice for ScriptedDice {
    fn delay_secs(&mut self, min: u64, max: u64) -> u64 {
        self.delays.pop_front().unwrap_or(min).clamp(min, max)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % len
    }
}
