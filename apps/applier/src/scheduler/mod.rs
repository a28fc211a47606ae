//! Periodic cycle scheduler with an explicit Idle → Running → StopRequested
//! state machine.
//!
//! The loop runs one cycle as soon as it starts and then one per interval.
//! State is consulted only between cycles: a stop request never interrupts
//! the cycle in flight, it only prevents the next one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::pipeline::report::CycleReport;
use crate::pipeline::{CycleError, Orchestrator, RunMode};

pub mod console;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BotState {
    Idle,
    Running,
    StopRequested,
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Scheduler cannot start while {0:?}")]
    NotIdle(BotState),
}

/// Point-in-time view for the control surface.
#[derive(Debug, Clone, Serialize)]
pub struct BotStatus {
    pub state: BotState,
    pub interval_minutes: u64,
    pub cycles_run: u64,
    /// A cycle (scheduled or manual) holds the run lock right now.
    pub cycle_in_progress: bool,
    pub last_cycle: Option<CycleReport>,
}

struct Inner {
    orchestrator: Arc<Orchestrator>,
    interval: Duration,
    mode: RunMode,
    state: watch::Sender<BotState>,
    cycles_run: AtomicU64,
}

/// Cheap to clone; every clone controls the same loop.
#[derive(Clone)]
pub struct BotController {
    inner: Arc<Inner>,
}

impl BotController {
    pub fn new(orchestrator: Arc<Orchestrator>, interval: Duration, mode: RunMode) -> Self {
        let (state, _) = watch::channel(BotState::Idle);
        Self {
            inner: Arc::new(Inner {
                orchestrator,
                interval,
                mode,
                state,
                cycles_run: AtomicU64::new(0),
            }),
        }
    }

    pub fn state(&self) -> BotState {
        *self.inner.state.borrow()
    }

    /// Cycles attempted by the loop, including ones that errored.
    pub fn cycles_run(&self) -> u64 {
        self.inner.cycles_run.load(Ordering::Acquire)
    }

    pub fn status(&self) -> BotStatus {
        BotStatus {
            state: self.state(),
            interval_minutes: self.inner.interval.as_secs() / 60,
            cycles_run: self.cycles_run(),
            cycle_in_progress: self.inner.orchestrator.is_running(),
            last_cycle: self.inner.orchestrator.last_report(),
        }
    }

    /// Idle → Running, spawning the loop.
    pub fn start(&self) -> Result<JoinHandle<()>, BotError> {
        let mut started = false;
        self.inner.state.send_if_modified(|state| {
            if *state == BotState::Idle {
                *state = BotState::Running;
                started = true;
            }
            started
        });
        if !started {
            return Err(BotError::NotIdle(self.state()));
        }

        let inner = Arc::clone(&self.inner);
        Ok(tokio::spawn(run_loop(inner)))
    }

    /// Running → StopRequested. Returns false in any other state.
    pub fn request_stop(&self) -> bool {
        let requested = self.inner.state.send_if_modified(|state| {
            if *state == BotState::Running {
                *state = BotState::StopRequested;
                true
            } else {
                false
            }
        });
        if requested {
            info!("Stop requested; the scheduler exits after the current cycle");
        }
        requested
    }

    /// Resolves once the loop has exited (immediately if it is not running).
    pub async fn stopped(&self) {
        let mut rx = self.inner.state.subscribe();
        let _ = rx.wait_for(|state| *state == BotState::Idle).await;
    }
}

async fn run_loop(inner: Arc<Inner>) {
    let mut ticker = tokio::time::interval(inner.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut state_rx = inner.state.subscribe();

    info!(
        "Scheduler started: one cycle every {} minutes ({:?})",
        inner.interval.as_secs() / 60,
        inner.mode
    );

    loop {
        // A pending stop wins over a tick that is ready at the same time.
        tokio::select! {
            biased;
            _ = state_rx.wait_for(|state| *state == BotState::StopRequested) => break,
            _ = ticker.tick() => {}
        }

        match inner.orchestrator.run_cycle(inner.mode).await {
            Ok(_) => {}
            Err(CycleError::AlreadyRunning) => {
                warn!("Skipping scheduled cycle: another cycle is still running")
            }
            Err(e) => error!("Scheduled cycle failed: {e}"),
        }
        inner.cycles_run.fetch_add(1, Ordering::AcqRel);

        if *inner.state.borrow() == BotState::StopRequested {
            break;
        }
    }

    inner.state.send_replace(BotState::Idle);
    info!("Scheduler stopped");
}
