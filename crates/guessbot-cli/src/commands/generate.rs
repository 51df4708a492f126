//! The `guessbot generate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use guessbot_core::parser::BankFile;
use guessbot_providers::config::load_config_from;

use crate::sources::llm_source;
use crate::SourceArgs;

pub async fn execute(source_args: SourceArgs, output: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(source_args.config.as_deref())?;
    let source = llm_source(&source_args, &config)?;

    eprintln!("Generating questions with {}...", source.name());
    let bank = source.fetch(source_args.theme.as_deref()).await?;
    let file = BankFile::from_bank(&bank);

    let Some(path) = output else {
        print!("{}", file.to_toml()?);
        return Ok(());
    };

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let rendered = if is_json {
        serde_json::to_string_pretty(&file).context("failed to serialize question bank")?
    } else {
        file.to_toml()?
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(&path, rendered)
        .with_context(|| format!("failed to write bank: {}", path.display()))?;
    eprintln!("Saved {} questions to {}", bank.len(), path.display());

    Ok(())
}
