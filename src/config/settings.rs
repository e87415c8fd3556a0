// Configuration structs

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Settings for the local Ollama generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Base URL of the Ollama host
    #[serde(default = "default_host")]
    pub host: String,

    /// Model name passed in every generation request
    #[serde(default = "default_model")]
    pub model: String,

    /// Token budget per generation request (`num_predict`)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen2.5-coder:1.5b".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.3
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Settings for the GitLab change source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitLabConfig {
    /// Personal access token sent as PRIVATE-TOKEN. Required.
    #[serde(default)]
    pub token: String,

    /// Verify TLS certificates when talking to GitLab
    #[serde(default = "default_true")]
    pub ssl_verify: bool,
}

fn default_true() -> bool {
    true
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub gitlab: GitLabConfig,
}

impl Config {
    /// Validate configuration and return helpful errors.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.ai.host.contains("://") {
            anyhow::bail!(
                "Invalid Ollama host '{}': expected a URL like http://localhost:11434",
                self.ai.host
            );
        }

        if self.ai.max_tokens == 0 {
            anyhow::bail!("max_tokens must be greater than 0");
        }

        if !(0.0..=2.0).contains(&self.ai.temperature) {
            anyhow::bail!(
                "temperature ({}) out of range; expected 0.0-2.0",
                self.ai.temperature
            );
        }

        if self.gitlab.token.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "GITLAB_TOKEN is required. Set it in the environment or in \
                 ~/.mrplan/config.toml under [gitlab]"
                    .to_string(),
            )
            .into());
        }

        Ok(())
    }
}
