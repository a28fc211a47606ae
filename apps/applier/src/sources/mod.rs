//! Job Source Adapter: fetches raw postings from the configured sources and
//! normalises them into `JobPosting`s.
//!
//! Sources are polled sequentially in registry order. A source that fails or
//! times out contributes nothing to the cycle; the rest still run. Duplicate
//! urls across sources are passed through untouched (the orchestrator owns
//! dedupe).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{with_timeout, CollaboratorError};
use crate::models::job::{JobPosting, SourceTag};

pub mod feed;
pub mod file;

pub use feed::FeedSource;
pub use file::FileSource;

#[async_trait]
pub trait JobSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<JobPosting>, CollaboratorError>;
}

/// Where a configured source reads from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceLocation {
    /// HTTP endpoint returning a JSON array of job dictionaries.
    Feed { url: String },
    /// Local JSON file with the same shape.
    File { path: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default)]
    pub platform: SourceTag,
    #[serde(flatten)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SourceRegistry {
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl SourceRegistry {
    /// Loads the registry; a missing file means "no sources", not an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Job source registry {} not found; no sources configured", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job source registry {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid job source registry {}", path.display()))
    }

    pub fn build(&self, client: &reqwest::Client) -> Vec<Arc<dyn JobSource>> {
        self.sources
            .iter()
            .map(|config| -> Arc<dyn JobSource> {
                match &config.location {
                    SourceLocation::Feed { url } => Arc::new(FeedSource::new(
                        config.name.clone(),
                        url.clone(),
                        config.platform,
                        client.clone(),
                    )),
                    SourceLocation::File { path } => Arc::new(FileSource::new(
                        config.name.clone(),
                        path.into(),
                        config.platform,
                    )),
                }
            })
            .collect()
    }
}

/// Polls every source in order and concatenates their postings.
pub struct SourceAggregator {
    sources: Vec<Arc<dyn JobSource>>,
    timeout: Duration,
}

impl SourceAggregator {
    pub fn new(sources: Vec<Arc<dyn JobSource>>, timeout: Duration) -> Self {
        Self { sources, timeout }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub async fn fetch_all(&self) -> Vec<JobPosting> {
        let mut all = Vec::new();
        for source in &self.sources {
            match with_timeout("fetch", self.timeout, source.fetch()).await {
                Ok(jobs) => {
                    info!("Source '{}' returned {} jobs", source.name(), jobs.len());
                    all.extend(jobs);
                }
                Err(e) => warn!("Source '{}' failed, skipping it this cycle: {e}", source.name()),
            }
        }
        all
    }
}

/// Turns a JSON payload (bare array, or an object with a `jobs` array) into
/// postings, dropping records without title/company/url.
pub fn parse_postings(
    payload: &Value,
    platform: SourceTag,
    source_name: &str,
) -> Result<Vec<JobPosting>, CollaboratorError> {
    let records = payload
        .as_array()
        .or_else(|| payload.get("jobs").and_then(Value::as_array))
        .ok_or_else(|| {
            CollaboratorError::rejected(format!(
                "source '{source_name}' did not return a list of jobs"
            ))
        })?;

    let mut jobs = Vec::with_capacity(records.len());
    for raw in records {
        match JobPosting::from_raw(raw, platform) {
            Some(job) => jobs.push(job),
            None => warn!("Source '{source_name}' returned a record without title/company/url"),
        }
    }
    Ok(jobs)
}
