use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Unset: tailoring fails for every job.
    pub anthropic_api_key: Option<String>,
    pub base_resume_path: PathBuf,
    pub resume_output_dir: PathBuf,
    pub job_sources_path: PathBuf,
    pub job_criteria_path: Option<PathBuf>,
    /// Unset: the built-in keyword scorer is used.
    pub ats_api_url: Option<String>,
    /// Unset: every cycle runs as a dry run.
    pub submit_command: Option<String>,
    pub notify_webhook_url: Option<String>,
    pub min_match_score: f64,
    pub max_failed_attempts: i64,
    pub batch_notify_every: i64,
    pub run_interval: Duration,
    pub export_path: PathBuf,
    pub call_timeout: Duration,
    pub submit_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let config = Config {
            database_url: require(&lookup, "DATABASE_URL")?,
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            base_resume_path: optional("BASE_RESUME_PATH")
                .unwrap_or_else(|| "data/resume.txt".to_string())
                .into(),
            resume_output_dir: optional("RESUME_OUTPUT_DIR")
                .unwrap_or_else(|| "resume_templates/output".to_string())
                .into(),
            job_sources_path: optional("JOB_SOURCES_PATH")
                .unwrap_or_else(|| "configs/job_sources.json".to_string())
                .into(),
            job_criteria_path: optional("JOB_CRITERIA_PATH").map(PathBuf::from),
            ats_api_url: optional("ATS_API_URL"),
            submit_command: optional("SUBMIT_COMMAND"),
            notify_webhook_url: optional("NOTIFY_WEBHOOK_URL"),
            min_match_score: parse_or(&lookup, "MIN_MATCH_SCORE", 50.0)?,
            max_failed_attempts: parse_or(&lookup, "MAX_FAILED_ATTEMPTS", 2)?,
            batch_notify_every: parse_or(&lookup, "BATCH_NOTIFY_EVERY", 50)?,
            run_interval: minutes(parse_or(&lookup, "RUN_INTERVAL_MINUTES", 60)?)
                .context("RUN_INTERVAL_MINUTES is too large")?,
            export_path: optional("EXPORT_PATH")
                .unwrap_or_else(|| "successful_applications.csv".to_string())
                .into(),
            call_timeout: Duration::from_secs(parse_or(&lookup, "CALL_TIMEOUT_SECS", 120)?),
            submit_timeout: Duration::from_secs(parse_or(&lookup, "SUBMIT_TIMEOUT_SECS", 300)?),
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };

        if !(0.0..=100.0).contains(&config.min_match_score) {
            anyhow::bail!("MIN_MATCH_SCORE must be between 0 and 100");
        }
        if config.run_interval.is_zero() {
            anyhow::bail!("RUN_INTERVAL_MINUTES must be at least 1");
        }
        Ok(config)
    }
}

/// `None` when the value does not fit in seconds.
pub fn minutes(value: u64) -> Option<Duration> {
    value.checked_mul(60).map(Duration::from_secs)
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
