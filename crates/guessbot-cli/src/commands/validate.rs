//! The `guessbot validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use guessbot_core::parser::load_bank_file;
use guessbot_providers::config::load_config_from;

pub fn execute(bank_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank = load_bank_file(&bank_path)?;

    println!("Bank: {} ({} questions)", bank_path.display(), bank.len());
    for (i, question) in bank.questions().iter().enumerate() {
        let points: u32 = question.point_values().iter().sum();
        println!(
            "  Question {}: {} ({} answers, {} points, {} opponent guesses)",
            i + 1,
            question.prompt(),
            question.slot_count(),
            points,
            bank.guesses(i).len()
        );
    }

    bank.validate(&config.game)
        .with_context(|| format!("bank does not fit the game rules: {}", bank_path.display()))?;
    println!("Bank valid.");

    Ok(())
}
