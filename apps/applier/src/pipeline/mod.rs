// Pipeline Orchestrator: fetch → dedupe → score → tailor → submit → record,
// then export and batch notification. One cycle at a time per process.

pub mod criteria;
pub mod orchestrator;
pub mod pending;
pub mod policy;
pub mod report;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::CollaboratorError;
use crate::resume::ResumeError;
use crate::store::StoreError;

pub use orchestrator::{Collaborators, Orchestrator, PipelineSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Live,
    /// Everything except submission; writes `test` records.
    DryRun,
}

impl RunMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            RunMode::DryRun
        } else {
            RunMode::Live
        }
    }
}

/// Conditions that abort a whole cycle. Per-job failures never surface here.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("A job cycle is already running")]
    AlreadyRunning,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resume(#[from] ResumeError),
}

/// Failures of an ad hoc resume analysis.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Job description has no keywords to score against")]
    NoKeywords,

    #[error("Resume text is too short to analyze")]
    ResumeTooShort,

    #[error(transparent)]
    Resume(#[from] ResumeError),

    #[error("Scoring failed: {0}")]
    Scoring(#[from] CollaboratorError),
}
