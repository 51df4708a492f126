//! The `guessbot init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("guessbot.toml").exists() {
        println!("guessbot.toml already exists, skipping.");
    } else {
        std::fs::write("guessbot.toml", SAMPLE_CONFIG)?;
        println!("Created guessbot.toml");
    }

    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Play offline: guessbot play --bank banks/example.toml");
    println!("  2. Edit guessbot.toml with your API keys");
    println!("  3. Play with fresh questions: guessbot play --theme science");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# guessbot configuration

default_provider = "openai"
default_model = "gpt-4o"
default_temperature = 0.9
max_retries = 3
retry_delay_ms = 1000

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

# [providers.azure]
# type = "azure"
# api_key = "${AZURE_OPENAI_API_KEY}"
# endpoint = "https://my-resource.openai.azure.com"
# deployment = "gpt-4o"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

[game]
questions_per_session = 3
slots_per_question = 6
round_time_limit_secs = 20
bot_min_delay_secs = 8
bot_max_delay_secs = 15
match_threshold = 0.8
bot_uses_decoys = false
"#;

const EXAMPLE_BANK: &str = r#"# Each question needs 6 answers whose points add up to 100.
# `guesses` is what the bot may say; it defaults to `answers`.

[[questions]]
prompt = "Name a pet people keep at home"
answers = ["Dog", "Cat", "Fish", "Bird", "Hamster", "Rabbit"]
points = [40, 25, 15, 10, 5, 5]
guesses = ["Dog", "Cat", "Fish", "Bird", "Hamster", "Rabbit", "Turtle", "Snake", "Lizard", "Ferret"]

[[questions]]
prompt = "Name a fruit you eat for breakfast"
answers = ["Banana", "Apple", "Orange", "Strawberry", "Blueberry", "Grapefruit"]
points = [30, 25, 20, 10, 10, 5]

[[questions]]
prompt = "Name something you take to the beach"
answers = ["Towel", "Sunscreen", "Umbrella", "Sunglasses", "Water", "Book"]
points = [35, 25, 15, 10, 10, 5]
"#;
