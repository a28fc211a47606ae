use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::errors::AppError;
use crate::pipeline::RunMode;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TriggerCycleRequest {
    #[serde(default)]
    pub dry_run: bool,
    /// Return 202 immediately and run the cycle on a background task.
    #[serde(default)]
    pub background: bool,
}

/// POST /api/v1/cycles
pub async fn handle_trigger_cycle(
    State(state): State<AppState>,
    body: Option<Json<TriggerCycleRequest>>,
) -> Result<Response, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let mode = state.orchestrator.effective_mode(RunMode::from_dry_run(req.dry_run));

    if !req.background {
        let report = state.orchestrator.run_cycle(mode).await?;
        return Ok(Json(report).into_response());
    }

    // Claim the run lock before answering, so 202 means the cycle will run.
    let slot = state.orchestrator.reserve()?;
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.run_reserved(slot, mode).await {
            error!("Background cycle failed: {e}");
        }
    });
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": "accepted", "mode": mode })),
    )
        .into_response())
}
