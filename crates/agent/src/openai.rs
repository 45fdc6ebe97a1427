use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use vanguide_core::config::SummarizerConfig;

use crate::llm::LlmClient;

pub const SUMMARY_TEMPERATURE: f32 = 0.2;

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    temperature: f32,
}

/// Client for the OpenAI Responses API (`POST {base_url}/responses`).
pub struct OpenAiResponsesClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl std::fmt::Debug for OpenAiResponsesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiResponsesClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiResponsesClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build summarizer http client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    /// Builds a client when the config enables model calls; `Ok(None)` otherwise.
    pub fn from_config(config: &SummarizerConfig) -> Result<Option<Self>> {
        if !config.model_enabled() {
            return Ok(None);
        }
        let api_key =
            config.api_key.clone().ok_or_else(|| anyhow!("summarizer api key is missing"))?;

        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAiResponsesClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/responses", self.base_url);
        let body = ResponsesRequest {
            model: &self.model,
            input: prompt,
            temperature: SUMMARY_TEMPERATURE,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .context("responses request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("responses endpoint returned {status}");
        }

        let payload: Value =
            response.json().await.context("failed to decode responses payload")?;
        extract_output_text(&payload).ok_or_else(|| anyhow!("responses payload had no output text"))
    }
}

/// Reads `output_text`, or joins the `output_text` parts of `output[].content[]`.
pub fn extract_output_text(payload: &Value) -> Option<String> {
    if let Some(text) = payload.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let parts: Vec<&str> = payload
        .get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    (!parts.is_empty()).then(|| parts.join(""))
}
