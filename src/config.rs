use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pacing::FixedPacer;

/// Top-level configuration for both pipeline stages
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// Transcript collection settings
    pub collector: CollectorConfig,
    /// Recipe generation settings
    pub generator: GeneratorConfig,
    /// Completion API settings
    pub provider: ProviderConfig,
}

/// Settings for the transcript collector
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CollectorConfig {
    /// Line-delimited transcript file, appended to
    pub output_path: PathBuf,
    /// Video URLs to collect
    pub urls: Vec<String>,
    /// Optional file with one URL per line
    pub urls_file: Option<PathBuf>,
    /// Base URL of the transcript site
    pub transcript_base_url: String,
    /// Extra request headers sent to the transcript site
    pub headers: HashMap<String, String>,
    /// Cookies sent to the transcript site, as `name=value` pairs
    ///
    /// Kept as a list because configuration keys are case-folded on load
    /// and cookie names are case-sensitive.
    pub cookies: Vec<String>,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Pause after a request that reached the site, in milliseconds
    pub cooldown_ms: u64,
    /// Pause after a failed request, in milliseconds
    pub error_cooldown_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("transcript.jsonl"),
            urls: Vec::new(),
            urls_file: None,
            transcript_base_url: default_transcript_base_url(),
            headers: HashMap::new(),
            cookies: Vec::new(),
            timeout: 15,
            cooldown_ms: 3000,
            error_cooldown_ms: 5000,
        }
    }
}

impl CollectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn pacer(&self) -> FixedPacer {
        FixedPacer::new(
            Duration::from_millis(self.cooldown_ms),
            Duration::from_millis(self.error_cooldown_ms),
        )
    }
}

/// Settings for the recipe generator
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Transcript file produced by the collector
    pub input_path: PathBuf,
    /// Instruction dataset file, overwritten on every run
    pub output_path: PathBuf,
    /// Pause after a successful completion, in milliseconds
    pub cooldown_ms: u64,
    /// Pause after a failed completion, in milliseconds
    pub error_cooldown_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("transcript.jsonl"),
            output_path: PathBuf::from("recipe_dataset.jsonl"),
            cooldown_ms: 1200,
            error_cooldown_ms: 3000,
        }
    }
}

impl GeneratorConfig {
    pub fn pacer(&self) -> FixedPacer {
        FixedPacer::new(
            Duration::from_millis(self.cooldown_ms),
            Duration::from_millis(self.error_cooldown_ms),
        )
    }
}

/// Configuration for the completion API
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    /// Wire protocol: "openai" (any OpenAI-compatible endpoint) or "anthropic"
    pub name: String,
    /// Model identifier (e.g., "deepseek-chat")
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for the API endpoint
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "openai".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 0.2,
            max_tokens: 1000,
            api_key: None,
            base_url: None,
            timeout: 60,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn default_transcript_base_url() -> String {
    "https://youtubetotranscript.com".to_string()
}

impl PipelineConfig {
    /// Load configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        load_config(None)
    }
}

/// Load configuration from file and environment variables
///
/// Configuration is loaded with the following priority (highest to lowest):
/// 1. Environment variables with RECIPES__ prefix
/// 2. The given file, or config.toml in the current directory
/// 3. Default values
///
/// Environment variable format: RECIPES__PROVIDER__API_KEY
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    let file = match path {
        // An explicitly requested file must exist
        Some(path) => File::from(path).required(true),
        None => File::with_name("config").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("RECIPES")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
