//! Configuration file loading and the provider factory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use guessbot_core::config::GameConfig;
use guessbot_core::generator::GeneratorConfig;
use guessbot_core::traits::LlmProvider;

use crate::anthropic::AnthropicProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single LLM provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Azure {
        api_key: String,
        endpoint: String,
        deployment: String,
        #[serde(default)]
        api_version: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Azure {
                api_key: _,
                endpoint,
                deployment,
                api_version,
            } => f
                .debug_struct("Azure")
                .field("api_key", &"***")
                .field("endpoint", endpoint)
                .field("deployment", deployment)
                .field("api_version", api_version)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level guessbot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessbotConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
    /// Provider used to generate questions.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model (or Azure deployment) used to generate questions.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature; high for varied questions.
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    /// Max retries on provider errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds; doubles each attempt.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Rules of the game.
    #[serde(default)]
    pub game: GameConfig,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o".to_string()
}
fn default_temperature() -> f64 {
    0.9
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}

impl Default for GuessbotConfig {
    fn default() -> Self {
        Self {
            providers: BTreeMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            game: GameConfig::default(),
        }
    }
}

impl GuessbotConfig {
    /// Generator settings derived from the defaults above.
    pub fn generator(&self) -> GeneratorConfig {
        GeneratorConfig {
            model: self.default_model.clone(),
            temperature: self.default_temperature,
            ..GeneratorConfig::default()
        }
    }

    /// Look up a configured provider, with a hint when it is missing.
    pub fn provider(&self, name: &str) -> Result<&ProviderConfig> {
        self.providers.get(name).with_context(|| {
            let known: Vec<&str> = self.providers.keys().map(String::as_str).collect();
            if known.is_empty() {
                format!(
                    "provider '{name}' is not configured; run `guessbot init` or set GUESSBOT_{}_KEY",
                    name.to_uppercase()
                )
            } else {
                format!(
                    "provider '{name}' is not configured (configured: {})",
                    known.join(", ")
                )
            }
        })
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    let opt = |v: &Option<String>| v.as_deref().map(resolve_env_vars);
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: opt(base_url),
            org_id: opt(org_id),
        },
        ProviderConfig::Azure {
            api_key,
            endpoint,
            deployment,
            api_version,
        } => ProviderConfig::Azure {
            api_key: resolve_env_vars(api_key),
            endpoint: resolve_env_vars(endpoint),
            deployment: resolve_env_vars(deployment),
            api_version: opt(api_version),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: opt(base_url),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `guessbot.toml` in the current directory
/// 2. `~/.config/guessbot/config.toml`
///
/// Environment variable overrides: `GUESSBOT_OPENAI_KEY`, `GUESSBOT_ANTHROPIC_KEY`,
/// `GUESSBOT_AZURE_KEY`.
pub fn load_config() -> Result<GuessbotConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GuessbotConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("guessbot.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<GuessbotConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => GuessbotConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    config
        .game
        .validate()
        .context("invalid [game] section in config")?;

    Ok(config)
}

/// Apply `GUESSBOT_*_KEY` overrides. OpenAI and Anthropic entries are created
/// when missing; Azure needs an endpoint and deployment, so only an existing
/// entry has its key replaced.
fn apply_env_overrides(config: &mut GuessbotConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(key) = env("GUESSBOT_OPENAI_KEY") {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Some(key) = env("GUESSBOT_ANTHROPIC_KEY") {
        let entry = config
            .providers
            .entry("anthropic".into())
            .or_insert(ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Anthropic { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Some(key) = env("GUESSBOT_AZURE_KEY") {
        if let Some(ProviderConfig::Azure { api_key, .. }) = config.providers.get_mut("azure") {
            *api_key = key;
        }
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("guessbot"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    let require_key = |key: &str| {
        if key.trim().is_empty() {
            anyhow::bail!("provider '{name}' has an empty api_key");
        }
        Ok(())
    };
    match config {
        ProviderConfig::Anthropic { api_key, base_url } => {
            require_key(api_key)?;
            Ok(Box::new(AnthropicProvider::new(api_key, base_url.clone())))
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            require_key(api_key)?;
            Ok(Box::new(OpenAiProvider::new(
                api_key,
                base_url.clone(),
                org_id.clone(),
            )))
        }
        ProviderConfig::Azure {
            api_key,
            endpoint,
            deployment,
            api_version,
        } => {
            require_key(api_key)?;
            Ok(Box::new(OpenAiProvider::azure(
                api_key,
                endpoint,
                deployment,
                api_version.clone(),
            )))
        }
        ProviderConfig::Ollama { base_url } => Ok(Box::new(OllamaProvider::new(base_url))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const FULL_CONFIG: &str = r#"
default_provider = "azure"
default_model = "quiz-gpt4o"
max_retries = 5

[providers.azure]
type = "azure"
api_key = "az-test"
endpoint = "https://quiz.openai.azure.com"
deployment = "quiz-gpt4o"

[providers.anthropic]
type = "anthropic"
api_key = "sk-test"

[providers.ollama]
type = "ollama"

[game]
round_time_limit_secs = 30
bot_uses_decoys = true
"#;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_GUESSBOT_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_GUESSBOT_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_GUESSBOT_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_close_${BRACE"), "no_close_${BRACE");
        std::env::remove_var("_GUESSBOT_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = GuessbotConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.default_temperature, 0.9);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.game, GameConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let config: GuessbotConfig = toml::from_str(FULL_CONFIG).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.max_retries, 5);
        assert!(matches!(
            config.providers.get("ollama"),
            Some(ProviderConfig::Ollama { base_url }) if base_url == "http://localhost:11434"
        ));
        assert_eq!(config.game.round_time_limit_secs, 30);
        assert!(config.game.bot_uses_decoys);
        assert_eq!(config.game.slots_per_question, 6);
        assert_eq!(config.generator().model, "quiz-gpt4o");
    }

    #[test]
    fn debug_masks_api_keys() {
        let config: GuessbotConfig = toml::from_str(FULL_CONFIG).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("az-test"));
        assert!(!rendered.contains("sk-test"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn env_overrides_create_and_replace_keys() {
        let mut config: GuessbotConfig = toml::from_str(FULL_CONFIG).unwrap();
        let env: HashMap<&str, &str> = [
            ("GUESSBOT_OPENAI_KEY", "sk-env-openai"),
            ("GUESSBOT_ANTHROPIC_KEY", "sk-env-anthropic"),
            ("GUESSBOT_AZURE_KEY", "az-env"),
        ]
        .into();
        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert!(matches!(
            config.providers.get("openai"),
            Some(ProviderConfig::OpenAI { api_key, .. }) if api_key == "sk-env-openai"
        ));
        assert!(matches!(
            config.providers.get("anthropic"),
            Some(ProviderConfig::Anthropic { api_key, .. }) if api_key == "sk-env-anthropic"
        ));
        assert!(matches!(
            config.providers.get("azure"),
            Some(ProviderConfig::Azure { api_key, .. }) if api_key == "az-env"
        ));
    }

    #[test]
    fn azure_key_alone_does_not_invent_a_provider() {
        let mut config = GuessbotConfig::default();
        apply_env_overrides(&mut config, |name| {
            (name == "GUESSBOT_AZURE_KEY").then(|| "az-env".to_string())
        });
        assert!(config.providers.is_empty());
    }

    #[test]
    fn load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guessbot.toml");
        std::fs::write(&path, FULL_CONFIG).unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_provider, "azure");

        let missing = dir.path().join("nope.toml");
        let err = load_config_from(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn invalid_game_section_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guessbot.toml");
        std::fs::write(&path, "[game]\nbot_min_delay_secs = 20\n").unwrap();

        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("bot delay range is empty"));
    }

    #[test]
    fn missing_provider_hint() {
        let config = GuessbotConfig::default();
        let err = config.provider("openai").unwrap_err();
        assert!(err.to_string().contains("GUESSBOT_OPENAI_KEY"));
    }

    #[test]
    fn factory_builds_each_provider() {
        let config: GuessbotConfig = toml::from_str(FULL_CONFIG).unwrap();
        for (name, provider_config) in &config.providers {
            let provider = create_provider(name, provider_config).unwrap();
            assert_eq!(provider.name(), name.as_str());
        }

        let empty = ProviderConfig::OpenAI {
            api_key: " ".into(),
            base_url: None,
            org_id: None,
        };
        assert!(create_provider("openai", &empty).is_err());
    }
}
