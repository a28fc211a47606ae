//! Match Scorer: pluggable, trait-based scorer that measures a posting against
//! the base resume.
//!
//! Default: `KeywordMatchScorer` (pure-Rust, fast, deterministic, fully testable).
//! Optional: `RemoteMatchScorer` (an external ATS scoring service, see `remote`).
//!
//! The orchestrator holds an `Arc<dyn MatchScorer>`, chosen at startup via config.

use async_trait::async_trait;

use crate::errors::CollaboratorError;
use crate::models::job::JobPosting;
use crate::models::matching::MatchResult;
use crate::resume::ResumeDocument;

pub mod keyword;
pub mod remote;

pub use keyword::KeywordMatchScorer;
pub use remote::RemoteMatchScorer;

/// Implement this to swap scoring backends without touching the orchestrator.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(
        &self,
        job: &JobPosting,
        resume: &ResumeDocument,
    ) -> Result<MatchResult, CollaboratorError>;
}
