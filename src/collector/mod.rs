//! Resumable transcript collection.
//!
//! The output file is an append-only log. Every run rebuilds the set of
//! known identifiers from it, skips those, and appends one flushed line per
//! newly fetched transcript, so an interrupted run loses nothing already
//! written.

mod extractor;
mod fetcher;

pub use extractor::extract_transcript_text;
pub use fetcher::TranscriptFetcher;

use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

use crate::config::CollectorConfig;
use crate::error::{ItemFailure, PipelineError};
use crate::jsonl::{load_processed_ids, ProcessedIds, TranscriptWriter};
use crate::model::TranscriptRecord;
use crate::pacing::{Pace, Pacer};

/// Extract the video identifier from the `v` query parameter of `url`
pub fn extract_identifier(url: &str) -> Result<String, PipelineError> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| PipelineError::InvalidInput(format!("'{}' is not a URL: {}", url, e)))?;

    parsed
        .query_pairs()
        .find(|(key, value)| key == "v" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| PipelineError::InvalidInput(format!("no video id in '{}'", url)))
}

/// Read source URLs from a file, one per line
///
/// Blank lines and lines starting with `#` are ignored.
pub fn load_url_list(path: &Path) -> Result<Vec<String>, PipelineError> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

/// Every URL to collect: the configured list, then the URL file, then `extra`
pub fn source_urls(config: &CollectorConfig, extra: &[String]) -> Result<Vec<String>, PipelineError> {
    let mut urls = config.urls.clone();
    if let Some(path) = &config.urls_file {
        urls.extend(load_url_list(path)?);
    }
    urls.extend(extra.iter().cloned());
    Ok(urls)
}

/// What happened to a single source URL
#[derive(Debug)]
pub enum UrlOutcome {
    /// Identifier was already in the output file
    Skipped,
    /// Transcript was appended to the output file
    Fetched,
    /// Page had no transcript; nothing was written
    Empty,
    /// Request or extraction failed
    Failed(PipelineError),
    /// URL carried no identifier; no request was made
    Invalid(PipelineError),
}

/// Summary of a collection run
#[derive(Debug, Default)]
pub struct CollectReport {
    /// Identifiers found in the output file before the run
    pub already_known: usize,
    pub fetched: usize,
    pub skipped: usize,
    pub empty: usize,
    pub failures: Vec<ItemFailure>,
    /// The run stopped early on a manual interrupt
    pub interrupted: bool,
}

impl CollectReport {
    fn record(&mut self, key: &str, outcome: UrlOutcome) {
        match outcome {
            UrlOutcome::Skipped => self.skipped += 1,
            UrlOutcome::Fetched => self.fetched += 1,
            UrlOutcome::Empty => self.empty += 1,
            UrlOutcome::Failed(e) | UrlOutcome::Invalid(e) => {
                self.failures.push(ItemFailure::new(key, &e))
            }
        }
    }
}

/// Collects transcripts for a list of URLs into a line-delimited file
pub struct Collector {
    fetcher: TranscriptFetcher,
    pacer: Box<dyn Pacer>,
    output_path: PathBuf,
    stop: Arc<AtomicBool>,
}

impl Collector {
    pub fn new(config: &CollectorConfig, pacer: Box<dyn Pacer>) -> Result<Self, PipelineError> {
        Ok(Self {
            fetcher: TranscriptFetcher::new(config)?,
            pacer,
            output_path: config.output_path.clone(),
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that stops the run before the next URL once set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Process `urls` in order, appending new transcripts to the output file
    ///
    /// Per-URL failures are logged and recorded in the report. Only failing
    /// to read or write the output file aborts the run.
    pub async fn run(&self, urls: &[String]) -> Result<CollectReport, PipelineError> {
        let mut known = load_processed_ids(&self.output_path)?;
        info!("Already collected: {}", known.len());
        if known.unparseable_lines > 0 {
            warn!(
                "{} unreadable line(s) in {}",
                known.unparseable_lines,
                self.output_path.display()
            );
        }

        let mut writer = TranscriptWriter::open(&self.output_path)?;
        let mut report = CollectReport {
            already_known: known.len(),
            ..CollectReport::default()
        };

        for url in urls {
            if self.stop_requested() {
                info!("[STOP] Manual interrupt, progress saved.");
                report.interrupted = true;
                break;
            }

            let id = match extract_identifier(url) {
                Ok(id) => id,
                Err(e) => {
                    error!("[ERROR] {}: {}", url, e);
                    report.record(url, UrlOutcome::Invalid(e));
                    continue;
                }
            };

            let outcome = self.collect_one(&id, &mut known, &mut writer).await?;
            let pace = match &outcome {
                UrlOutcome::Skipped | UrlOutcome::Empty | UrlOutcome::Invalid(_) => None,
                UrlOutcome::Fetched => Some(Pace::Success),
                UrlOutcome::Failed(_) => Some(Pace::Failure),
            };
            report.record(&id, outcome);

            if let Some(pace) = pace {
                if !self.stop_requested() {
                    self.pacer.pause(pace).await;
                }
            }
        }

        info!(
            "Collected {} new, skipped {}, empty {}, failed {}",
            report.fetched,
            report.skipped,
            report.empty,
            report.failures.len()
        );
        Ok(report)
    }

    async fn collect_one(
        &self,
        id: &str,
        known: &mut ProcessedIds,
        writer: &mut TranscriptWriter,
    ) -> Result<UrlOutcome, PipelineError> {
        if known.contains(id) {
            info!("[SKIP] {}", id);
            return Ok(UrlOutcome::Skipped);
        }

        let text = match self.fetcher.fetch_transcript(id).await {
            Ok(text) => text,
            Err(e) => {
                error!("[ERROR] {}: {}", id, e);
                return Ok(UrlOutcome::Failed(e));
            }
        };

        if text.trim().is_empty() {
            warn!("[EMPTY] {}", id);
            return Ok(UrlOutcome::Empty);
        }

        writer.append(&TranscriptRecord::new(id, text))?;
        known.insert(id);
        info!("[OK] {}", id);
        Ok(UrlOutcome::Fetched)
    }
}
