//! Remote ATS scoring service.
//!
//! Request: `POST {ATS_API_URL}` with `{"job_description": ..., "resume": ...}`.
//! Response: `{"score", "matched", "missing"}`; the legacy keys
//! `Final ATS Score` / `Matched Keywords` / `Missing Keywords` are accepted too.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::CollaboratorError;
use crate::models::job::JobPosting;
use crate::models::matching::MatchResult;
use crate::resume::ResumeDocument;
use crate::scoring::MatchScorer;

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    job_description: &'a str,
    resume: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    #[serde(default, alias = "Final ATS Score")]
    score: Option<f64>,
    #[serde(default, alias = "Matched Keywords")]
    matched: Vec<String>,
    #[serde(default, alias = "Missing Keywords")]
    missing: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ScoreResponse {
    fn into_result(self) -> Result<MatchResult, CollaboratorError> {
        if let Some(error) = self.error {
            return Err(CollaboratorError::rejected(format!("scoring service: {error}")));
        }
        let score = self
            .score
            .ok_or_else(|| CollaboratorError::rejected("scoring service returned no score"))?;
        Ok(MatchResult::new(
            score,
            self.matched.into_iter().collect(),
            self.missing.into_iter().collect(),
        ))
    }
}

pub struct RemoteMatchScorer {
    client: Client,
    url: String,
}

impl RemoteMatchScorer {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl MatchScorer for RemoteMatchScorer {
    async fn score(
        &self,
        job: &JobPosting,
        resume: &ResumeDocument,
    ) -> Result<MatchResult, CollaboratorError> {
        let response: ScoreResponse = self
            .client
            .post(&self.url)
            .json(&ScoreRequest {
                job_description: &job.description,
                resume: &resume.text,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_result()
    }
}
