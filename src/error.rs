use thiserror::Error;

/// Errors that can occur while collecting transcripts or generating recipes
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source URL does not carry a usable video identifier
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transcript site answered with a non-200 status
    #[error("HTTP {status} from {url}")]
    Fetch { status: u16, url: String },

    /// Transport-level failure (timeout, connection, decoding)
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A persisted line could not be interpreted
    #[error("Malformed record on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The completion API call failed or returned no usable text
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration loaded but is not usable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error building HTTP headers from configuration
    #[error("Header error: {0}")]
    Header(String),
}

impl From<reqwest::header::InvalidHeaderValue> for PipelineError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        PipelineError::Header(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for PipelineError {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        PipelineError::Header(err.to_string())
    }
}

/// A per-item failure recorded during a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    /// Video identifier, or the raw URL when no identifier could be extracted
    pub key: String,
    pub reason: String,
}

impl ItemFailure {
    pub fn new(key: impl Into<String>, err: &PipelineError) -> Self {
        ItemFailure {
            key: key.into(),
            reason: err.to_string(),
        }
    }
}
