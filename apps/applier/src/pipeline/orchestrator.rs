//! Pipeline Orchestrator: drives one job cycle end to end.
//!
//! Per job, strictly in order:
//!   criteria → dedupe/retry check → score → threshold → tailor → (queue)
//! then, once every fetched job has been evaluated, the queue is drained
//! through the submitter and every attempt is appended to the record store.
//!
//! Every collaborator call returns `Result<_, CollaboratorError>` and runs
//! under a deadline; failures become per-job outcomes. Only the record store
//! and the base resume can abort a cycle.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::OwnedMutexGuard;
use tracing::{error, info, warn};

use crate::errors::with_timeout;
use crate::models::application::{ApplicationRecord, ApplicationStatus};
use crate::models::job::{JobPosting, SourceTag};
use crate::models::matching::MatchResult;
use crate::notify::BatchReport;
use crate::pipeline::criteria::JobCriteria;
use crate::pipeline::pending::{PendingJob, PendingJobs};
use crate::pipeline::policy::{ApplyPolicy, HistoryDecision};
use crate::pipeline::report::{CycleReport, Disposition, FailedStage, JobOutcome, SkipReason};
use crate::pipeline::{AnalyzeError, CycleError, RunMode};
use crate::resume::{ResumeDocument, MIN_RESUME_CHARS};
use crate::scoring::keyword::extract_keywords;
use crate::scoring::MatchScorer;
use crate::sources::SourceAggregator;
use crate::store::{ExportSummary, RecordStore, StoreError};
use crate::submission::ApplicationSubmitter;
use crate::tailoring::ResumeTailor;

const DEFAULT_EXPORT_NAME: &str = "successful_applications.csv";

// ────────────────────────────────────────────────────────────────────────────
// Wiring
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub policy: ApplyPolicy,
    /// Batch notification every N cumulative successes. 0 disables it.
    pub batch_notify_every: i64,
    pub export_path: PathBuf,
    pub base_resume_path: PathBuf,
    /// Deadline for scoring and tailoring calls.
    pub call_timeout: Duration,
    pub submit_timeout: Duration,
}

pub struct Collaborators {
    pub sources: SourceAggregator,
    pub scorer: Arc<dyn MatchScorer>,
    pub tailor: Arc<dyn ResumeTailor>,
    /// `None` forces every cycle to dry-run.
    pub submitter: Option<Arc<dyn ApplicationSubmitter>>,
    pub criteria: Option<JobCriteria>,
}

pub struct Orchestrator {
    settings: PipelineSettings,
    collaborators: Collaborators,
    store: RecordStore,
    run_lock: Arc<tokio::sync::Mutex<()>>,
    last_report: Mutex<Option<CycleReport>>,
}

/// Exclusive right to run one cycle in this process, held until dropped.
pub struct CycleSlot {
    _guard: OwnedMutexGuard<()>,
}

impl Orchestrator {
    pub fn new(settings: PipelineSettings, collaborators: Collaborators, store: RecordStore) -> Self {
        Self {
            settings,
            collaborators,
            store,
            run_lock: Arc::new(tokio::sync::Mutex::new(())),
            last_report: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// The most recent cycle that ran to completion.
    pub fn last_report(&self) -> Option<CycleReport> {
        self.last_report.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn effective_mode(&self, requested: RunMode) -> RunMode {
        match (requested, &self.collaborators.submitter) {
            (RunMode::Live, Some(_)) => RunMode::Live,
            _ => RunMode::DryRun,
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Cycle
    // ────────────────────────────────────────────────────────────────────────

    /// Claims the run lock without waiting. Fails with `AlreadyRunning` if
    /// another cycle holds it in this process. Cycles in different processes
    /// are not coordinated.
    pub fn reserve(&self) -> Result<CycleSlot, CycleError> {
        let guard = Arc::clone(&self.run_lock)
            .try_lock_owned()
            .map_err(|_| CycleError::AlreadyRunning)?;
        Ok(CycleSlot { _guard: guard })
    }

    /// Runs one full cycle.
    pub async fn run_cycle(&self, requested: RunMode) -> Result<CycleReport, CycleError> {
        let slot = self.reserve()?;
        self.run_reserved(slot, requested).await
    }

    /// Runs one full cycle under a slot taken earlier with `reserve`.
    pub async fn run_reserved(
        &self,
        _slot: CycleSlot,
        requested: RunMode,
    ) -> Result<CycleReport, CycleError> {
        let mode = self.effective_mode(requested);
        if mode != requested {
            warn!("No submitter configured; running as dry run");
        }

        let mut report = CycleReport::begin(mode);
        info!("Job cycle {} started ({:?})", report.cycle_id, mode);

        self.store.initialize().await?;
        let resume = ResumeDocument::load(&self.settings.base_resume_path).await?;

        let jobs = self.collaborators.sources.fetch_all().await;
        report.fetched = jobs.len();
        info!(
            "Fetched {} jobs from {} sources",
            jobs.len(),
            self.collaborators.sources.source_count()
        );

        // Phase 1: evaluate every posting and queue the ones worth submitting.
        let mut seen = HashSet::new();
        let mut pending = PendingJobs::default();
        for job in jobs {
            if !seen.insert(job.url.clone()) {
                info!("Skipping {} at {}: already seen this cycle ({})", job.title, job.company, job.url);
                report.record(JobOutcome::skipped(&job, None, SkipReason::DuplicateInCycle));
                continue;
            }
            if let Some(outcome) = self.evaluate(job, &resume, &mut pending).await? {
                report.record(outcome);
            }
        }

        // Phase 2: submit and record.
        if pending.is_empty() {
            info!("Nothing to submit this cycle");
        } else {
            info!("{} jobs queued for submission", pending.len());
        }
        while let Some(item) = pending.pop() {
            let outcome = self.submit(item, mode).await?;
            report.record(outcome);
        }

        self.finish(&mut report).await;
        report.finished_at = Some(Utc::now());
        info!("Job cycle {} finished. {}", report.cycle_id, report.summary_line());

        if let Ok(mut last) = self.last_report.lock() {
            *last = Some(report.clone());
        }
        Ok(report)
    }

    /// Scores a resume against an arbitrary job description with the
    /// configured scorer. Falls back to the base resume when no text is given.
    /// Nothing is recorded and the run lock is not taken.
    pub async fn analyze(
        &self,
        job_description: &str,
        resume_text: Option<String>,
    ) -> Result<MatchResult, AnalyzeError> {
        if extract_keywords(job_description).is_empty() {
            return Err(AnalyzeError::NoKeywords);
        }

        let resume = match resume_text.filter(|text| !text.trim().is_empty()) {
            Some(text) if text.trim().chars().count() < MIN_RESUME_CHARS => {
                return Err(AnalyzeError::ResumeTooShort)
            }
            Some(text) => ResumeDocument {
                path: PathBuf::from("request"),
                text,
            },
            None => ResumeDocument::load(&self.settings.base_resume_path).await?,
        };

        let job = JobPosting {
            title: String::new(),
            company: String::new(),
            location: None,
            description: job_description.to_string(),
            url: String::new(),
            source: SourceTag::Custom,
        };
        let result = with_timeout(
            "scoring",
            self.settings.call_timeout,
            self.collaborators.scorer.score(&job, &resume),
        )
        .await?;
        info!("Ad hoc analysis scored {}", result.score);
        Ok(result)
    }

    /// Returns `None` when the job was queued, otherwise its final outcome.
    async fn evaluate(
        &self,
        job: JobPosting,
        resume: &ResumeDocument,
        pending: &mut PendingJobs,
    ) -> Result<Option<JobOutcome>, StoreError> {
        if let Some(criteria) = &self.collaborators.criteria {
            if let Err(detail) = criteria.check(&job) {
                info!("Skipping {} at {}: {detail}", job.title, job.company);
                return Ok(Some(JobOutcome::skipped(
                    &job,
                    None,
                    SkipReason::CriteriaMismatch { detail },
                )));
            }
        }

        match self.settings.policy.check_history(&self.store, &job.url).await? {
            HistoryDecision::Eligible => {}
            HistoryDecision::AlreadyApplied => {
                info!("Skipping {} at {}: already applied ({})", job.title, job.company, job.url);
                return Ok(Some(JobOutcome::skipped(&job, None, SkipReason::AlreadyApplied)));
            }
            HistoryDecision::RetryLimitReached { failures } => {
                info!(
                    "Skipping {} at {}: failed {failures} times before ({})",
                    job.title, job.company, job.url
                );
                return Ok(Some(JobOutcome::skipped(
                    &job,
                    None,
                    SkipReason::RetryLimitReached { failures },
                )));
            }
        }

        let scored = with_timeout(
            "scoring",
            self.settings.call_timeout,
            self.collaborators.scorer.score(&job, resume),
        )
        .await;
        let match_result = match scored {
            Ok(result) => result,
            Err(e) => {
                warn!("Scoring failed for {} at {}: {e}", job.title, job.company);
                return Ok(Some(JobOutcome::skipped(
                    &job,
                    None,
                    SkipReason::ScoringFailed { error: e.to_string() },
                )));
            }
        };

        let score = match_result.score;
        if !self.settings.policy.passes_threshold(&match_result) {
            info!(
                "Skipping {} at {}: score {score} below {}",
                job.title, job.company, self.settings.policy.min_match_score
            );
            return Ok(Some(JobOutcome::skipped(
                &job,
                Some(score),
                SkipReason::BelowThreshold { score },
            )));
        }

        let tailored = with_timeout(
            "tailoring",
            self.settings.call_timeout,
            self.collaborators.tailor.tailor(&job, resume),
        )
        .await;
        let artifact = match tailored {
            Ok(path) => path,
            Err(e) => {
                warn!("Tailoring failed for {} at {}: {e}", job.title, job.company);
                return Ok(Some(JobOutcome::new(
                    &job,
                    Some(score),
                    Disposition::Failed {
                        stage: FailedStage::Tailoring,
                        error: e.to_string(),
                        record_id: None,
                    },
                )));
            }
        };

        let outcome_if_rejected = JobOutcome::skipped(&job, Some(score), SkipReason::DuplicateInCycle);
        if pending.push(PendingJob {
            job,
            match_result,
            artifact,
        }) {
            Ok(None)
        } else {
            Ok(Some(outcome_if_rejected))
        }
    }

    async fn submit(&self, item: PendingJob, mode: RunMode) -> Result<JobOutcome, StoreError> {
        let PendingJob {
            job,
            match_result,
            artifact,
        } = item;
        let score = Some(match_result.score);

        let submitter = match (mode, &self.collaborators.submitter) {
            (RunMode::Live, Some(submitter)) => submitter,
            _ => {
                let record = ApplicationRecord::for_attempt(&job, &artifact, ApplicationStatus::Test);
                let receipt = self.store.append(&record).await?;
                info!("Dry run: would apply to {} at {}", job.title, job.company);
                return Ok(JobOutcome::new(
                    &job,
                    score,
                    Disposition::Tested {
                        record_id: receipt.id,
                    },
                ));
            }
        };

        let submitted = with_timeout(
            "submission",
            self.settings.submit_timeout,
            submitter.submit(&job, &artifact),
        )
        .await;

        match submitted {
            Ok(()) => {
                let record = ApplicationRecord::for_attempt(&job, &artifact, ApplicationStatus::Success);
                let receipt = self.store.append(&record).await?;
                info!("Applied to {} at {}", job.title, job.company);
                Ok(JobOutcome::new(
                    &job,
                    score,
                    Disposition::Applied {
                        record_id: receipt.id,
                    },
                ))
            }
            Err(e) => {
                warn!("Submission failed for {} at {}: {e}", job.title, job.company);
                let record = ApplicationRecord::for_attempt(&job, &artifact, ApplicationStatus::Failed);
                let receipt = self.store.append(&record).await?;
                Ok(JobOutcome::new(
                    &job,
                    score,
                    Disposition::Failed {
                        stage: FailedStage::Submission,
                        error: e.to_string(),
                        record_id: Some(receipt.id),
                    },
                ))
            }
        }
    }

    /// Cycle-end side effects: snapshot export, then the batch notification.
    /// Neither can fail the cycle; everything it reports is already recorded.
    async fn finish(&self, report: &mut CycleReport) {
        let export_path = &self.settings.export_path;
        let export = match self.store.export_successful(export_path).await {
            Ok(summary) => {
                report.export_path = Some(export_path.clone());
                summary
            }
            Err(e) => {
                error!("Export to {} failed: {e}", export_path.display());
                return;
            }
        };

        // Only cycles that added a success can cross a batch boundary.
        if report.tally.applied == 0 || self.settings.batch_notify_every <= 0 {
            return;
        }
        report.batch_notified = self.send_batch_if_due(export).await;
    }

    async fn send_batch_if_due(&self, export: ExportSummary) -> bool {
        let success_count = match self.store.success_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!("Could not count successes for batch notification: {e}");
                return false;
            }
        };
        if success_count == 0 || success_count % self.settings.batch_notify_every != 0 {
            return false;
        }

        let filename = self
            .settings
            .export_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string());
        self.store
            .notify_batch(&BatchReport {
                filename,
                csv: export.csv,
                success_count,
            })
            .await
    }
}
