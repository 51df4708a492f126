//! The `guessbot list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use guessbot_providers::ollama::OllamaProvider;
use guessbot_providers::{create_provider, ProviderConfig};

pub async fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = guessbot_providers::config::load_config_from(config_path.as_deref())?;

    let mut found_any = false;

    for (name, provider_config) in &config.providers {
        if provider_filter.as_ref().is_some_and(|filter| name != filter) {
            continue;
        }

        let models = match provider_config {
            ProviderConfig::Ollama { base_url } => {
                OllamaProvider::new(base_url).list_models_async().await
            }
            _ => create_provider(name, provider_config).map(|p| p.available_models()),
        };
        let models = match models {
            Ok(models) => models,
            Err(e) => {
                eprintln!("Provider {name}: {e:#}");
                continue;
            }
        };

        if !models.is_empty() {
            found_any = true;
            println!("Provider: {name}");
            for model in &models {
                if model.max_context > 0 {
                    println!(
                        "  {} - {} ({}K context)",
                        model.id,
                        model.name,
                        model.max_context / 1000
                    );
                } else {
                    println!("  {} - {}", model.id, model.name);
                }
            }
            println!();
        }
    }

    if !found_any {
        println!("No providers configured. Run `guessbot init` to create a config file.");
    }

    Ok(())
}
