use std::sync::Arc;

use crate::pipeline::Orchestrator;
use crate::scheduler::BotController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Runs cycles on demand; also owns the record store.
    pub orchestrator: Arc<Orchestrator>,
    /// The interval scheduler (the "Start Bot / Stop Bot" toggle).
    pub bot: BotController,
}
