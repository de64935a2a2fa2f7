use crate::config::ProviderConfig;
use crate::error::PipelineError;
use crate::providers::{AnthropicProvider, LlmProvider, OpenAIProvider};

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the provider named in the configuration
    pub fn create(config: &ProviderConfig) -> Result<Box<dyn LlmProvider>, PipelineError> {
        match config.name.as_str() {
            "openai" | "deepseek" => Ok(Box::new(OpenAIProvider::new(config)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config)?)),
            other => Err(PipelineError::InvalidConfig(format!(
                "Unknown provider: {} (available: {})",
                other,
                Self::available_providers().join(", ")
            ))),
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "deepseek", "anthropic"]
    }
}
