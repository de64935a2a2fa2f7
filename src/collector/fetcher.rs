use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, USER_AGENT};
use reqwest::{Client, StatusCode};
use url::Url;

use super::extractor::extract_transcript_text;
use crate::config::CollectorConfig;
use crate::error::PipelineError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches transcript pages from the transcript site
pub struct TranscriptFetcher {
    client: Client,
    base_url: String,
}

impl TranscriptFetcher {
    pub fn new(config: &CollectorConfig) -> Result<Self, PipelineError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        for (name, value) in &config.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        if !config.cookies.is_empty() {
            headers.insert(COOKIE, HeaderValue::from_str(&config.cookies.join("; "))?);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.transcript_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Page on the transcript site holding the transcript for `id`
    pub fn transcript_url(&self, id: &str) -> Result<Url, PipelineError> {
        Url::parse_with_params(&format!("{}/transcript", self.base_url), &[("v", id)]).map_err(
            |e| {
                PipelineError::InvalidConfig(format!(
                    "transcript_base_url '{}' is not a valid URL: {}",
                    self.base_url, e
                ))
            },
        )
    }

    /// Fetch the transcript for `id`; an empty string means the page had none
    pub async fn fetch_transcript(&self, id: &str) -> Result<String, PipelineError> {
        let url = self.transcript_url(id)?;
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(PipelineError::Fetch {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        Ok(extract_transcript_text(&html))
    }
}
