mod anthropic;
mod factory;
mod open_ai;
mod prompt;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_recipe_prompt, RECIPE_PROMPT_TEMPLATE, RECIPE_SYSTEM_PROMPT};

use async_trait::async_trait;

use crate::error::PipelineError;

/// Unified trait for chat-completion backends
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Request a single completion for a system/user message pair
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, PipelineError>;
}

/// Read an API key from config, falling back to the first set environment variable
fn resolve_api_key(configured: Option<&String>, env_vars: &[&str]) -> Result<String, PipelineError> {
    configured
        .filter(|key| !key.is_empty())
        .cloned()
        .or_else(|| {
            env_vars
                .iter()
                .filter_map(|var| std::env::var(var).ok())
                .find(|key| !key.is_empty())
        })
        .ok_or_else(|| {
            PipelineError::InvalidConfig(format!(
                "API key not found in config or environment ({})",
                env_vars.join(", ")
            ))
        })
}
