//! guessbot-core — Rounds, answer matching and the opponent bot.
//!
//! This crate holds the game itself: the question bank model, the fuzzy
//! answer matcher, the round state machine with its timed opponent, and the
//! session controller that front ends drive with guesses and clock ticks.

pub mod bot;
pub mod config;
pub mod dice;
pub mod error;
pub mod generator;
pub mod history;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod round;
pub mod session;
pub mod source;
pub mod traits;
