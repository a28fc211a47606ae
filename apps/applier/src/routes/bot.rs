use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::scheduler::BotStatus;
use crate::state::AppState;

/// GET /api/v1/bot
pub async fn handle_bot_status(State(state): State<AppState>) -> Json<BotStatus> {
    Json(state.bot.status())
}

/// POST /api/v1/bot/start
pub async fn handle_bot_start(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    state.bot.start()?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "state": state.bot.state() }))))
}

/// POST /api/v1/bot/stop
/// Takes effect once the cycle in flight (if any) has finished.
pub async fn handle_bot_stop(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if !state.bot.request_stop() {
        return Err(AppError::Conflict("Scheduler is not running".to_string()));
    }
    Ok((StatusCode::ACCEPTED, Json(json!({ "state": state.bot.state() }))))
}
