// Configuration loader
// Reads ~/.mrplan/config.toml when present, then applies environment overrides

use anyhow::{Context, Result};
use std::fs;

use super::settings::Config;

/// Load configuration from `~/.mrplan/config.toml` and the environment.
///
/// Environment variables override file values: OLLAMA_HOST, OLLAMA_MODEL,
/// AI_MAX_TOKENS, AI_TEMPERATURE, GITLAB_TOKEN, GITLAB_SSL_VERIFY.
pub fn load_config() -> Result<Config> {
    let mut config = try_load_from_file()?.unwrap_or_default();
    apply_env_overrides(&mut config)?;

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn try_load_from_file() -> Result<Option<Config>> {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return Ok(None),
    };
    let config_path = home.join(".mrplan/config.toml");

    if !config_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;

    let config = parse_config_toml(&contents)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;

    tracing::debug!("Loaded configuration from {}", config_path.display());
    Ok(Some(config))
}

fn parse_config_toml(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(Into::into)
}

fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(host) = std::env::var("OLLAMA_HOST") {
        if !host.is_empty() {
            config.ai.host = host;
        }
    }
    if let Ok(model) = std::env::var("OLLAMA_MODEL") {
        if !model.is_empty() {
            config.ai.model = model;
        }
    }
    if let Ok(raw) = std::env::var("AI_MAX_TOKENS") {
        config.ai.max_tokens = raw
            .parse()
            .with_context(|| format!("AI_MAX_TOKENS is not a number: '{raw}'"))?;
    }
    if let Ok(raw) = std::env::var("AI_TEMPERATURE") {
        config.ai.temperature = raw
            .parse()
            .with_context(|| format!("AI_TEMPERATURE is not a number: '{raw}'"))?;
    }
    if let Ok(token) = std::env::var("GITLAB_TOKEN") {
        if !token.is_empty() {
            config.gitlab.token = token;
        }
    }
    if let Ok(raw) = std::env::var("GITLAB_SSL_VERIFY") {
        config.gitlab.ssl_verify = raw.to_ascii_lowercase() != "false";
    }
    Ok(())
}
