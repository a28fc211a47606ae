use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

impl StatusQuery {
    fn parse(&self) -> Result<Option<ApplicationStatus>, AppError> {
        self.status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse().map_err(AppError::Validation))
            .transpose()
    }
}

/// GET /api/v1/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    let status = query.parse()?;
    Ok(Json(state.orchestrator.store().list(status).await?))
}

/// GET /api/v1/applications/export
pub async fn handle_export_applications(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = query.parse()?;
    let csv = state.orchestrator.store().render_csv(status).await?;
    let filename = match status {
        Some(status) => format!("{status}_applications.csv"),
        None => "applications.csv".to_string(),
    };
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}
