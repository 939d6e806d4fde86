use super::Refiner;
use super::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::config::RefineConfig;
use crate::error::RefineError;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Refiner backed by an OpenAI-compatible chat completions endpoint
pub struct ChatCompletionRefiner {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    system_prompt: String,
}

impl ChatCompletionRefiner {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, RefineError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        })
    }

    /// Build from configuration, reading the API key from the configured
    /// environment variable
    pub fn from_config(config: &RefineConfig) -> Result<Self, RefineError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RefineError::MissingApiKey(config.api_key_env.clone()))?;

        let refiner = Self::new(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
            config.temperature,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(match &config.system_prompt {
            Some(prompt) => refiner.with_system_prompt(prompt.clone()),
            None => refiner,
        })
    }

    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = prompt;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Refiner for ChatCompletionRefiner {
    async fn refine(&self, markdown: &str) -> Result<String, RefineError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": markdown },
            ],
        });

        debug!("Chat completion request to {} ({} chars)", url, markdown.len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RefineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                RefineError::MalformedResponse("missing choices[0].message.content".into())
            })?
            .to_string();

        Ok(content)
    }
}
