use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Scoring output for one posting within one cycle. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 0 – 100
    pub score: f64,
    pub matched: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

impl MatchResult {
    pub fn new(score: f64, matched: BTreeSet<String>, missing: BTreeSet<String>) -> Self {
        Self {
            score: score.clamp(0.0, 100.0),
            matched,
            missing,
        }
    }

    /// Inclusive lower bound: a score equal to `min_score` passes.
    pub fn meets(&self, min_score: f64) -> bool {
        self.score >= min_score
    }
}
