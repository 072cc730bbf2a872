//! # pulse-engine: Orchestration for Pulse Analytics
//!
//! Ties the pure math of [`pulse_core`] to the record fetching of
//! [`pulse_source`] and drives the aggregation passes the dashboard
//! lives on.
//!
//! ## Module Organization
//! ```text
//! pulse_engine/
//! ├── lib.rs          ◄─── You are here (exports)
//! ├── engine.rs       ◄─── DashboardEngine: fetch + join + generations
//! ├── refresh.rs      ◄─── RefreshScheduler: 60s cadence, clean shutdown
//! ├── config.rs       ◄─── EngineConfig: TOML + PULSE_* env overrides
//! └── error.rs        ◄─── EngineError: pass/scheduler failures
//! ```
//!
//! ## Pass Triggers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  initial load ──┐                                                       │
//! │  period change ─┼──► DashboardEngine::compute_dashboard(period)        │
//! │  60s interval ──┘         │                                             │
//! │                           ▼                                             │
//! │      fetch ×3 concurrently ─► join ─► generation check ─► publish      │
//! │                                                                         │
//! │  A fetch failure aborts the pass whole; the caller keeps showing the   │
//! │  last-known-good snapshot plus an error indicator with a retry.        │
//! │  A superseded pass is discarded silently.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pulse_core::Period;
//! use pulse_engine::{DashboardEngine, EngineConfig};
//! use pulse_source::RestSource;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::from_env();
//! config.validate()?;
//!
//! let source = Arc::new(RestSource::new(&config.base_url, config.fetch_timeout())?);
//! let engine = DashboardEngine::new(source, config.invoice_fetch_limit);
//!
//! let snapshot = engine.compute_dashboard(Period::Week).await?;
//! println!("revenue this week: {}", snapshot.dashboard.stats.revenue);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod refresh;

pub use config::EngineConfig;
pub use engine::{DashboardEngine, DashboardSnapshot};
pub use error::{EngineError, EngineResult};
pub use refresh::{DashboardEmitter, NoOpEmitter, RefreshHandle, RefreshScheduler};
