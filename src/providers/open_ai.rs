use crate::config::ProviderConfig;
use crate::error::PipelineError;
use crate::providers::{resolve_api_key, LlmProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Any OpenAI-compatible chat completions endpoint (DeepSeek by default)
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAIProvider {
    /// Create a new provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, PipelineError> {
        // Try config first, then fall back to environment variables
        let api_key = resolve_api_key(
            config.api_key.as_ref(),
            &["DEEPSEEK_API_KEY", "OPENAI_API_KEY"],
        )?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(OpenAIProvider {
            client: Client::builder().timeout(config.timeout()).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        let defaults = ProviderConfig::default();
        OpenAIProvider {
            client: Client::builder()
                .timeout(Duration::from_secs(defaults.timeout))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url,
            model,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, PipelineError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": prompt}
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Generation(format!(
                "HTTP {} from completion API: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);
        let content = response_body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                PipelineError::Generation("Failed to extract content from response".to_string())
            })?
            .to_string();

        Ok(content)
    }
}
