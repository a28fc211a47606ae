//! Dedupe, retry ceiling and score threshold.

use crate::models::matching::MatchResult;
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDecision {
    Eligible,
    AlreadyApplied,
    RetryLimitReached { failures: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplyPolicy {
    /// Inclusive lower bound on the match score.
    pub min_match_score: f64,
    pub max_failed_attempts: i64,
}

impl Default for ApplyPolicy {
    fn default() -> Self {
        Self {
            min_match_score: 50.0,
            max_failed_attempts: 2,
        }
    }
}

impl ApplyPolicy {
    pub fn decide(&self, succeeded: bool, failures: i64) -> HistoryDecision {
        if succeeded {
            HistoryDecision::AlreadyApplied
        } else if failures >= self.max_failed_attempts {
            HistoryDecision::RetryLimitReached { failures }
        } else {
            HistoryDecision::Eligible
        }
    }

    /// Reads the url's history from the store. `test` rows are ignored.
    pub async fn check_history(
        &self,
        store: &RecordStore,
        url: &str,
    ) -> Result<HistoryDecision, StoreError> {
        if store.has_succeeded(url).await? {
            return Ok(HistoryDecision::AlreadyApplied);
        }
        let failures = store.failure_count(url).await?;
        Ok(self.decide(false, failures))
    }

    pub fn passes_threshold(&self, result: &MatchResult) -> bool {
        result.meets(self.min_match_score)
    }
}
