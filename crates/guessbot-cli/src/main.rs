//! guessbot CLI — play the popular-answer quiz in a terminal.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

mod commands;
mod sources;

#[derive(Parser)]
#[command(
    name = "guessbot",
    version,
    about = "Guess the most popular answers before the bot does"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where questions come from.
#[derive(Args, Clone, Debug, Default)]
pub struct SourceArgs {
    /// Ask the model for questions on this theme
    #[arg(long)]
    theme: Option<String>,

    /// Provider to generate with (default: from config)
    #[arg(long)]
    provider: Option<String>,

    /// Model or deployment to generate with (default: from config)
    #[arg(long)]
    model: Option<String>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a session against the bot
    Play {
        #[command(flatten)]
        source: SourceArgs,

        /// Play from a bank file instead of generating questions
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Seed for the bot's timing and choices
        #[arg(long)]
        seed: Option<u64>,

        /// Clock tick interval in milliseconds
        #[arg(long, default_value = "100")]
        tick_ms: u64,
    },

    /// Generate a question bank and save it
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (.toml or .json); prints TOML to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a question bank file
    Validate {
        /// Path to the bank file
        #[arg(long)]
        bank: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("guessbot=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            source,
            bank,
            seed,
            tick_ms,
        } => commands::play::execute(source, bank, seed, tick_ms).await,
        Commands::Generate { source, output } => commands::generate::execute(source, output).await,
        Commands::Validate { bank, config } => commands::validate::execute(bank, config),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
