use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::pipeline::{AnalyzeError, CycleError};
use crate::scheduler::BotError;
use crate::store::StoreError;

/// Uniform failure returned by every external collaborator (sources, scorers,
/// tailors, submitters, notifiers). The orchestrator maps these onto per-job
/// outcomes; none of them abort a cycle.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{stage} timed out after {}s", .after.as_secs())]
    Timeout { stage: &'static str, after: Duration },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),
}

impl CollaboratorError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        CollaboratorError::Rejected(reason.into())
    }
}

/// Runs `fut` under a deadline, mapping expiry to `CollaboratorError::Timeout`.
pub async fn with_timeout<T, F>(
    stage: &'static str,
    after: Duration,
    fut: F,
) -> Result<T, CollaboratorError>
where
    F: std::future::Future<Output = Result<T, CollaboratorError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Timeout { stage, after }),
    }
}

/// Application-level error type for the HTTP surface.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CycleError> for AppError {
    fn from(e: CycleError) -> Self {
        match e {
            CycleError::AlreadyRunning => AppError::Conflict(e.to_string()),
            CycleError::Store(inner) => AppError::Store(inner),
            CycleError::Resume(inner) => AppError::Internal(inner.into()),
        }
    }
}

impl From<AnalyzeError> for AppError {
    fn from(e: AnalyzeError) -> Self {
        match e {
            AnalyzeError::NoKeywords | AnalyzeError::ResumeTooShort => {
                AppError::Validation(e.to_string())
            }
            AnalyzeError::Scoring(inner) => AppError::Upstream(inner.to_string()),
            AnalyzeError::Resume(inner) => AppError::Internal(inner.into()),
        }
    }
}

impl From<BotError> for AppError {
    fn from(e: BotError) -> Self {
        AppError::Conflict(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The application record store is unavailable".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
