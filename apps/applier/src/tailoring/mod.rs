//! Resume Tailoring: turns (job, base resume) into an artifact on disk.
//!
//! The artifact path returned here is what gets recorded against the
//! submission attempt. Artifacts are plain `.txt` files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::errors::CollaboratorError;
use crate::llm_client::LlmClient;
use crate::models::job::JobPosting;
use crate::resume::ResumeDocument;

pub mod prompts;

use prompts::{TAILOR_PROMPT_TEMPLATE, TAILOR_SYSTEM};

const MAX_SLUG_LEN: usize = 60;
const URL_TAG_LEN: usize = 8;

#[async_trait]
pub trait ResumeTailor: Send + Sync {
    async fn tailor(
        &self,
        job: &JobPosting,
        resume: &ResumeDocument,
    ) -> Result<PathBuf, CollaboratorError>;
}

pub struct LlmResumeTailor {
    llm: LlmClient,
    output_dir: PathBuf,
}

impl LlmResumeTailor {
    pub fn new(llm: LlmClient, output_dir: PathBuf) -> Self {
        Self { llm, output_dir }
    }
}

#[async_trait]
impl ResumeTailor for LlmResumeTailor {
    async fn tailor(
        &self,
        job: &JobPosting,
        resume: &ResumeDocument,
    ) -> Result<PathBuf, CollaboratorError> {
        let prompt = build_tailor_prompt(job, resume);
        let tailored = self.llm.call_text(&prompt, TAILOR_SYSTEM).await?;

        let path = artifact_path(&self.output_dir, job);
        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(&path, tailored).await?;

        info!("Tailored resume saved to {}", path.display());
        Ok(path)
    }
}

/// Used when no LLM key is configured. Every job fails at the tailoring stage
/// and nothing is submitted.
pub struct UnavailableTailor {
    reason: String,
}

impl UnavailableTailor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ResumeTailor for UnavailableTailor {
    async fn tailor(
        &self,
        _job: &JobPosting,
        _resume: &ResumeDocument,
    ) -> Result<PathBuf, CollaboratorError> {
        Err(CollaboratorError::rejected(self.reason.clone()))
    }
}

fn build_tailor_prompt(job: &JobPosting, resume: &ResumeDocument) -> String {
    TAILOR_PROMPT_TEMPLATE
        .replace("{title}", &job.title)
        .replace("{company}", &job.company)
        .replace("{job_description}", &job.description)
        .replace("{resume}", &resume.text)
}

/// `<dir>/resume_<company>_<title>_<url tag>.txt`
///
/// The tag keeps postings that share a company and title (the same role in
/// two locations) from overwriting each other's artifact.
pub fn artifact_path(output_dir: &Path, job: &JobPosting) -> PathBuf {
    output_dir.join(format!(
        "resume_{}_{}_{}.txt",
        slug(&job.company),
        slug(&job.title),
        url_tag(&job.url)
    ))
}

/// First 8 hex digits of the name-based (v5) UUID of the url.
fn url_tag(url: &str) -> String {
    let id = Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes());
    id.simple().to_string()[..URL_TAG_LEN].to_string()
}

fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let bounded: String = out.trim_start_matches('_').chars().take(MAX_SLUG_LEN).collect();
    let trimmed = bounded.trim_end_matches('_');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}
