//! Per-cycle bookkeeping: what happened to each posting, and the tally.
//! Observational only; nothing here is persisted.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::job::JobPosting;
use crate::pipeline::RunMode;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Same url already seen earlier in this cycle.
    DuplicateInCycle,
    CriteriaMismatch { detail: String },
    AlreadyApplied,
    RetryLimitReached { failures: i64 },
    /// Scorer failed; the job is dropped for this cycle only.
    ScoringFailed { error: String },
    BelowThreshold { score: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    Tailoring,
    Submission,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum Disposition {
    Applied {
        record_id: i64,
    },
    Tested {
        record_id: i64,
    },
    Failed {
        stage: FailedStage,
        error: String,
        /// Only submission failures are written to the store.
        record_id: Option<i64>,
    },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobOutcome {
    pub url: String,
    pub title: String,
    pub company: String,
    pub score: Option<f64>,
    #[serde(flatten)]
    pub disposition: Disposition,
}

impl JobOutcome {
    pub fn new(job: &JobPosting, score: Option<f64>, disposition: Disposition) -> Self {
        Self {
            url: job.url.clone(),
            title: job.title.clone(),
            company: job.company.clone(),
            score,
            disposition,
        }
    }

    pub fn skipped(job: &JobPosting, score: Option<f64>, reason: SkipReason) -> Self {
        Self::new(job, score, Disposition::Skipped(reason))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleTally {
    pub applied: u32,
    pub skipped: u32,
    pub failed: u32,
    /// Dry-run passes recorded as `test`.
    pub tested: u32,
}

impl CycleTally {
    fn count(&mut self, disposition: &Disposition) {
        match disposition {
            Disposition::Applied { .. } => self.applied += 1,
            Disposition::Tested { .. } => self.tested += 1,
            Disposition::Failed { .. } => self.failed += 1,
            Disposition::Skipped(_) => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub mode: RunMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub fetched: usize,
    pub tally: CycleTally,
    pub outcomes: Vec<JobOutcome>,
    pub export_path: Option<PathBuf>,
    pub batch_notified: bool,
}

impl CycleReport {
    pub fn begin(mode: RunMode) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            mode,
            started_at: Utc::now(),
            finished_at: None,
            fetched: 0,
            tally: CycleTally::default(),
            outcomes: Vec::new(),
            export_path: None,
            batch_notified: false,
        }
    }

    pub fn record(&mut self, outcome: JobOutcome) {
        self.tally.count(&outcome.disposition);
        self.outcomes.push(outcome);
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Stats: Applied={}, Skipped={}, Failed={}, Tested={}",
            self.tally.applied, self.tally.skipped, self.tally.failed, self.tally.tested
        )
    }
}
