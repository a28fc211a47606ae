pub mod analyze;
pub mod applications;
pub mod bot;
pub mod cycles;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Cycle triggers
        .route("/api/v1/cycles", post(cycles::handle_trigger_cycle))
        // Scheduler toggle
        .route("/api/v1/bot", get(bot::handle_bot_status))
        .route("/api/v1/bot/start", post(bot::handle_bot_start))
        .route("/api/v1/bot/stop", post(bot::handle_bot_stop))
        // Ad hoc resume analysis
        .route("/api/v1/analyze", post(analyze::handle_analyze))
        // Application history
        .route(
            "/api/v1/applications",
            get(applications::handle_list_applications),
        )
        .route(
            "/api/v1/applications/export",
            get(applications::handle_export_applications),
        )
        .with_state(state)
}
