//! In-memory collaborators and fixtures shared by the unit tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use crate::errors::CollaboratorError;
use crate::models::application::{ApplicationRecord, ApplicationStatus};
use crate::models::job::{JobPosting, SourceTag};
use crate::models::matching::MatchResult;
use crate::notify::{BatchReport, Notifier};
use crate::pipeline::criteria::JobCriteria;
use crate::pipeline::policy::ApplyPolicy;
use crate::pipeline::{Collaborators, Orchestrator, PipelineSettings};
use crate::resume::ResumeDocument;
use crate::scoring::MatchScorer;
use crate::sources::{JobSource, SourceAggregator};
use crate::store::memory::MemoryStore;
use crate::store::RecordStore;
use crate::submission::ApplicationSubmitter;
use crate::tailoring::{artifact_path, ResumeTailor};

pub const RESUME_TEXT: &str =
    "Jane Doe\nSenior Backend Engineer\nSkills: Rust, PostgreSQL, Kubernetes, distributed systems\n";

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn job(url: &str) -> JobPosting {
    job_with(url, "Engineer", "Acme")
}

pub fn job_with(url: &str, title: &str, company: &str) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        company: company.to_string(),
        location: Some("Remote".to_string()),
        description: "Backend work in Rust and PostgreSQL".to_string(),
        url: url.to_string(),
        source: SourceTag::Custom,
    }
}

pub fn record(url: &str, status: ApplicationStatus) -> ApplicationRecord {
    ApplicationRecord {
        timestamp: Utc::now(),
        title: "Engineer".to_string(),
        company: "Acme".to_string(),
        location: "Remote".to_string(),
        url: url.to_string(),
        resume_path: format!("out/{url}.txt"),
        status,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sources
// ────────────────────────────────────────────────────────────────────────────

enum SourceBehavior {
    Jobs(Vec<JobPosting>),
    Fail,
    Hang,
}

pub struct FakeSource {
    name: String,
    behavior: SourceBehavior,
}

impl FakeSource {
    pub fn ok(name: &str, jobs: Vec<JobPosting>) -> Self {
        Self {
            name: name.to_string(),
            behavior: SourceBehavior::Jobs(jobs),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            behavior: SourceBehavior::Fail,
        }
    }

    pub fn hanging(name: &str) -> Self {
        Self {
            name: name.to_string(),
            behavior: SourceBehavior::Hang,
        }
    }
}

#[async_trait]
impl JobSource for FakeSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<JobPosting>, CollaboratorError> {
        match &self.behavior {
            SourceBehavior::Jobs(jobs) => Ok(jobs.clone()),
            SourceBehavior::Fail => Err(CollaboratorError::rejected("board is down")),
            SourceBehavior::Hang => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scorer / tailor / submitter
// ────────────────────────────────────────────────────────────────────────────

/// Scores 75 unless told otherwise per url.
#[derive(Default)]
pub struct FakeScorer {
    scores: Mutex<HashMap<String, f64>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeScorer {
    pub fn set_score(&self, url: &str, score: f64) {
        self.scores.lock().unwrap().insert(url.to_string(), score);
    }

    pub fn fail_for(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MatchScorer for FakeScorer {
    async fn score(
        &self,
        job: &JobPosting,
        _resume: &ResumeDocument,
    ) -> Result<MatchResult, CollaboratorError> {
        self.calls.lock().unwrap().push(job.url.clone());
        if self.failing.lock().unwrap().contains(&job.url) {
            return Err(CollaboratorError::rejected("scoring service unreachable"));
        }
        let score = self.scores.lock().unwrap().get(&job.url).copied().unwrap_or(75.0);
        Ok(MatchResult::new(score, BTreeSet::new(), BTreeSet::new()))
    }
}

/// Returns the artifact path without writing anything.
#[derive(Default)]
pub struct FakeTailor {
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTailor {
    pub fn fail_for(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResumeTailor for FakeTailor {
    async fn tailor(
        &self,
        job: &JobPosting,
        _resume: &ResumeDocument,
    ) -> Result<PathBuf, CollaboratorError> {
        self.calls.lock().unwrap().push(job.url.clone());
        if self.failing.lock().unwrap().contains(&job.url) {
            return Err(CollaboratorError::rejected("model returned nothing"));
        }
        Ok(artifact_path(Path::new("out"), job))
    }
}

/// Records every submission in order; optionally slow.
#[derive(Default)]
pub struct FakeSubmitter {
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
}

impl FakeSubmitter {
    pub fn fail_for(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApplicationSubmitter for FakeSubmitter {
    async fn submit(&self, job: &JobPosting, _artifact: &Path) -> Result<(), CollaboratorError> {
        self.calls.lock().unwrap().push(job.url.clone());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&job.url) {
            return Err(CollaboratorError::rejected("form submit button not found"));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Notifier
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    fail: bool,
    attempts: Mutex<Vec<String>>,
    batches: Mutex<Vec<i64>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Urls of attempts notified, in order.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    /// Success counts carried by each batch message.
    pub fn batches(&self) -> Vec<i64> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_attempt(&self, record: &ApplicationRecord) -> Result<(), CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::rejected("smtp relay down"));
        }
        self.attempts.lock().unwrap().push(record.url.clone());
        Ok(())
    }

    async fn notify_batch(&self, report: &BatchReport) -> Result<(), CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::rejected("smtp relay down"));
        }
        self.batches.lock().unwrap().push(report.success_count);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Harness
// ────────────────────────────────────────────────────────────────────────────

/// Fakes plus a temp dir holding the base resume and the export target.
/// Every orchestrator built from one harness shares the same store and fakes.
pub struct Harness {
    pub memory: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub scorer: Arc<FakeScorer>,
    pub tailor: Arc<FakeTailor>,
    pub submitter: Arc<FakeSubmitter>,
    pub settings: PipelineSettings,
    pub criteria: Option<JobCriteria>,
    _dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let resume = dir.path().join("resume.txt");
        std::fs::write(&resume, RESUME_TEXT).unwrap();

        Self {
            memory: Arc::new(MemoryStore::default()),
            notifier: Arc::new(notifier),
            scorer: Arc::new(FakeScorer::default()),
            tailor: Arc::new(FakeTailor::default()),
            submitter: Arc::new(FakeSubmitter::default()),
            settings: PipelineSettings {
                policy: ApplyPolicy::default(),
                batch_notify_every: 50,
                export_path: dir.path().join("successful_applications.csv"),
                base_resume_path: resume,
                call_timeout: Duration::from_secs(30),
                submit_timeout: Duration::from_secs(60),
            },
            criteria: None,
            _dir: dir,
        }
    }

    pub fn store(&self) -> RecordStore {
        RecordStore::new(self.memory.clone(), self.notifier.clone())
    }

    /// Appends history rows through the real ledger.
    pub async fn seed(&self, records: &[ApplicationRecord]) {
        let store = self.store();
        for record in records {
            store.append(record).await.unwrap();
        }
    }

    pub fn orchestrator(&self, jobs: Vec<JobPosting>) -> Orchestrator {
        self.orchestrator_with_sources(vec![Arc::new(FakeSource::ok("fake", jobs))])
    }

    pub fn orchestrator_with_sources(&self, sources: Vec<Arc<dyn JobSource>>) -> Orchestrator {
        let submitter: Arc<dyn ApplicationSubmitter> = self.submitter.clone();
        self.build(sources, Some(submitter))
    }

    pub fn orchestrator_without_submitter(&self, jobs: Vec<JobPosting>) -> Orchestrator {
        self.build(vec![Arc::new(FakeSource::ok("fake", jobs))], None)
    }

    fn build(
        &self,
        sources: Vec<Arc<dyn JobSource>>,
        submitter: Option<Arc<dyn ApplicationSubmitter>>,
    ) -> Orchestrator {
        Orchestrator::new(
            self.settings.clone(),
            Collaborators {
                sources: SourceAggregator::new(sources, self.settings.call_timeout),
                scorer: self.scorer.clone(),
                tailor: self.tailor.clone(),
                submitter,
                criteria: self.criteria.clone(),
            },
            self.store(),
        )
    }
}
