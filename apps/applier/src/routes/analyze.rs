use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::matching::MatchResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub job_description: String,
    /// Defaults to the configured base resume.
    #[serde(default)]
    pub resume_text: Option<String>,
}

/// POST /api/v1/analyze
/// Scores a resume against a pasted job description. Nothing is recorded.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<MatchResult>, AppError> {
    let result = state
        .orchestrator
        .analyze(&req.job_description, req.resume_text)
        .await?;
    Ok(Json(result))
}
