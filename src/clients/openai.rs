//! OpenAI-compatible chat completions client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::traits::{GeneratorFactory, TextGenerator, non_empty};
use crate::config::ModelConfig;
use crate::error::{DaydreamError, Result};

pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn complete(&self, prompt: &str) -> Result<Option<String>> {
        debug!(
            "Requesting chat completion (model={}, chars={})",
            self.model,
            prompt.len()
        );

        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(DaydreamError::provider(format!(
                "chat completion failed with {}: {}",
                status, error_text
            )));
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| {
            DaydreamError::provider(format!("unreadable chat completion body: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);
        Ok(non_empty(content))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Shares one connection pool across runs; each run gets its own credential.
pub struct OpenAiGeneratorFactory {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiGeneratorFactory {
    pub fn new(cfg: &ModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| DaydreamError::config(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: cfg.base_url.clone(),
            model: cfg.model.clone(),
        })
    }
}

impl GeneratorFactory for OpenAiGeneratorFactory {
    fn for_credential(&self, credential: &str) -> Result<Arc<dyn TextGenerator>> {
        if credential.is_empty() {
            return Err(DaydreamError::validation("Missing apiKey or turns"));
        }
        Ok(Arc::new(OpenAiGenerator::new(
            self.client.clone(),
            self.base_url.clone(),
            credential,
            self.model.clone(),
        )))
    }

    fn provider(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
