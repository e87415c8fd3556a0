// HTTP client for the local Ollama API
//
// One client is built per pipeline run and reused across that run's
// sequential calls. It is never shared between runs.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiConfig;
use crate::error::PipelineError;

const REQUEST_TIMEOUT_SECS: u64 = 120;
const HEALTH_TIMEOUT_SECS: u64 = 5;

pub struct OllamaClient {
    http: Client,
    config: AiConfig,
}

impl OllamaClient {
    pub fn new(config: AiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http, config })
    }

    /// Cheap pre-flight availability probe.
    ///
    /// Never errors: any connectivity failure reads as "not healthy".
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/version", self.config.host);

        match self
            .http
            .get(&url)
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::debug!("Ollama health probe failed: {e}");
                false
            }
        }
    }

    /// Issue a single generation request. No retries, no caching.
    ///
    /// Any transport failure or non-success status is a connectivity error.
    pub async fn generate(&self, prompt: &str, system: &str) -> Result<String, PipelineError> {
        let url = format!("{}/api/generate", self.config.host);
        let payload = GenerateRequest {
            model: &self.config.model,
            prompt,
            system,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        tracing::debug!(model = %self.config.model, "Sending generation request to Ollama");

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                PipelineError::Connectivity(format!(
                    "Failed to connect to Ollama: {e}. Make sure Ollama is running."
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Connectivity(format!(
                "Ollama API error: {status} - {body}"
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            PipelineError::Connectivity(format!("Failed to decode Ollama response: {e}"))
        })?;

        Ok(body.response.trim().to_string())
    }
}

// Ollama API wire types

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}
