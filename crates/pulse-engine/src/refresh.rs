//! # Refresh Scheduler
//!
//! Recomputes the dashboard on a fixed cadence and on demand, as an
//! explicit background task with clean shutdown, never an ambient
//! interval tied to a UI component's lifetime.
//!
//! ## Scheduler Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      RefreshScheduler                                   │
//! │                                                                         │
//! │   tokio::select! {                                                      │
//! │     interval tick (60s) ──────► recompute current period               │
//! │     SetPeriod(p) from handle ─► switch period, recompute now           │
//! │     Refresh from handle ──────► recompute now (manual retry)           │
//! │     shutdown from handle ─────► break                                  │
//! │   }                                                                     │
//! │                                                                         │
//! │   Pass outcome:                                                         │
//! │     Ok(snapshot)     ──► emitter.emit_snapshot                         │
//! │     Err(Superseded)  ──► debug log only (a newer pass already won)     │
//! │     Err(other)       ──► emitter.emit_error; last-known-good stands    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first tick fires immediately, which doubles as the initial load.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use pulse_core::Period;

use crate::engine::{DashboardEngine, DashboardSnapshot};
use crate::error::{EngineError, EngineResult};

// =============================================================================
// Emitter Trait
// =============================================================================

/// Receives scheduler output (implemented by the presentation layer's
/// integration; tests record what arrives).
pub trait DashboardEmitter: Send + Sync {
    /// A pass published a fresh snapshot.
    fn emit_snapshot(&self, snapshot: &DashboardSnapshot);

    /// A pass failed; the last-known-good snapshot still stands and the
    /// caller should offer a retry when `retryable` is true.
    fn emit_error(&self, message: &str, retryable: bool);
}

/// No-op emitter for callers that only poll [`DashboardEngine::latest`].
pub struct NoOpEmitter;

impl DashboardEmitter for NoOpEmitter {
    fn emit_snapshot(&self, _snapshot: &DashboardSnapshot) {}
    fn emit_error(&self, _message: &str, _retryable: bool) {}
}

// =============================================================================
// Commands
// =============================================================================

/// Control messages from the handle to the scheduler.
#[derive(Debug, Clone, Copy)]
enum Command {
    /// Switch the active period and recompute immediately.
    SetPeriod(Period),
    /// Recompute the active period immediately (manual retry).
    Refresh,
}

// =============================================================================
// Refresh Scheduler
// =============================================================================

/// Periodic dashboard recomputation with explicit lifecycle.
pub struct RefreshScheduler {
    /// Engine that runs the passes.
    engine: Arc<DashboardEngine>,

    /// Cadence between scheduled recomputes.
    interval: Duration,

    /// Period currently being charted.
    period: Period,

    /// Emitter for snapshots and errors.
    emitter: Arc<dyn DashboardEmitter>,

    /// Command receiver.
    command_rx: mpsc::Receiver<Command>,

    /// Shutdown receiver.
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling a running scheduler.
#[derive(Clone)]
pub struct RefreshHandle {
    command_tx: mpsc::Sender<Command>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Switches the active period; the scheduler recomputes immediately.
    pub async fn set_period(&self, period: Period) -> EngineResult<()> {
        self.command_tx
            .send(Command::SetPeriod(period))
            .await
            .map_err(|_| EngineError::Channel("command channel closed".to_string()))
    }

    /// Requests an immediate recompute of the active period.
    pub async fn refresh(&self) -> EngineResult<()> {
        self.command_tx
            .send(Command::Refresh)
            .await
            .map_err(|_| EngineError::Channel("command channel closed".to_string()))
    }

    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl RefreshScheduler {
    /// Creates a scheduler and its control handle.
    pub fn new(
        engine: Arc<DashboardEngine>,
        interval: Duration,
        initial_period: Period,
        emitter: Arc<dyn DashboardEmitter>,
    ) -> (Self, RefreshHandle) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let scheduler = RefreshScheduler {
            engine,
            interval,
            period: initial_period,
            emitter,
            command_rx,
            shutdown_rx,
        };

        let handle = RefreshHandle {
            command_tx,
            shutdown_tx,
        };

        (scheduler, handle)
    }

    /// Runs the scheduler loop.
    ///
    /// This should be spawned as a background task. The first interval
    /// tick fires immediately and doubles as the initial load.
    pub async fn run(mut self) {
        info!(
            period = %self.period,
            interval_secs = self.interval.as_secs(),
            "Refresh scheduler starting"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.refresh_once().await;
                }

                Some(command) = self.command_rx.recv() => {
                    match command {
                        Command::SetPeriod(period) => {
                            if period != self.period {
                                debug!(previous = %self.period, next = %period, "period changed");
                                self.period = period;
                            }
                            interval.reset();
                            self.refresh_once().await;
                        }
                        Command::Refresh => {
                            interval.reset();
                            self.refresh_once().await;
                        }
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Refresh scheduler shutting down");
                    break;
                }
            }
        }

        info!("Refresh scheduler stopped");
    }

    /// Runs one pass and routes the outcome.
    async fn refresh_once(&self) {
        match self.engine.compute_dashboard(self.period).await {
            Ok(snapshot) => {
                debug!(generation = snapshot.generation, "scheduled pass published");
                self.emitter.emit_snapshot(&snapshot);
            }
            Err(EngineError::Superseded { generation }) => {
                debug!(generation, "scheduled pass superseded, discarded");
            }
            Err(err) => {
                warn!(%err, "scheduled pass failed; last-known-good stands");
                self.emitter.emit_error(&err.to_string(), err.is_retryable());
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
