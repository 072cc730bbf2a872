//! # pulse-core: Pure Aggregation Math for Pulse Analytics
//!
//! This crate is the **heart** of the analytics engine. It turns raw
//! transaction, invoice, and product records into financial KPIs, product
//! rankings, margin histograms, and chart-ready time series, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Pulse Analytics Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Dashboard Frontend (out of scope)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pulse-engine                                 │   │
//! │  │    concurrent fetch ──► generation check ──► publish snapshot   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pulse-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌─────────────────┐  │   │
//! │  │   │  period  │ │   cost   │ │ aggregate │ │ ranking/series/ │  │   │
//! │  │   │  windows │ │ resolver │ │   KPIs    │ │ invoice stats   │  │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └─────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK ACCESS • PURE FUNCTIONS                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Canonical record types and derived output types
//! - [`period`] - Period selectors, windows, and bucket calendars
//! - [`cost`] - Per-sale unit-cost resolution with provenance
//! - [`aggregate`] - Scalar KPI aggregation over one period
//! - [`ranking`] - Per-product rollups, rankings, margin histogram
//! - [`series`] - Time-series binning onto the period's bucket axis
//! - [`invoice`] - Period-filtered invoice statistics
//! - [`dashboard`] - One-pass composition of everything above
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output; `now` is a parameter,
//!    never read from the system clock
//! 2. **No I/O**: network, database, and file access are FORBIDDEN here
//! 3. **Single Pass**: one enrichment per transaction per pass; every
//!    series produced in a pass shares that pass's bucket axis
//! 4. **Round at the Edge**: monetary outputs round to 2 decimals at the
//!    point of exposure, never during accumulation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use pulse_core::{Dashboard, Period};
//!
//! let dashboard = Dashboard::compute(Period::Week, Utc::now(), &[], &[], &[]);
//!
//! // A week always charts Mon..Sun, even with no data
//! assert_eq!(dashboard.series.labels.len(), 7);
//! assert_eq!(dashboard.stats.revenue, 0.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod cost;
pub mod dashboard;
pub mod error;
pub mod invoice;
pub mod period;
pub mod ranking;
pub mod series;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pulse_core::Period` instead of
// `use pulse_core::period::Period`

pub use dashboard::Dashboard;
pub use error::CoreError;
pub use invoice::InvoiceStats;
pub use period::{Period, PeriodWindow};
pub use ranking::{MarginBand, MarginHistogram, ProductRankings};
pub use series::ChartSeries;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Modeled operating expenses as a fraction of revenue.
///
/// ## Why a constant?
/// The 15% rate is a fixed business assumption of the product, not a
/// per-tenant setting. Net profit is always `gross − revenue × this rate`.
pub const OPERATING_EXPENSE_RATE: f64 = 0.15;

/// Fraction of a selling price assumed to be cost when the catalog has no
/// cost price (a 40% nominal margin).
///
/// Applied by the cost resolver to `selling_price`, or as a last resort to
/// the transaction's own unit price. Estimates made this way are flagged
/// `cost_is_actual = false` so the frontend can badge them.
pub const ESTIMATED_COST_RATE: f64 = 0.60;

/// Number of entries in each ranked product list (top revenue, top profit,
/// low margin).
pub const TOP_PRODUCT_LIMIT: usize = 5;

/// Products whose average margin falls below this percentage land on the
/// low-margin watch list (only when they have revenue in the period).
pub const LOW_MARGIN_THRESHOLD_PERCENT: f64 = 20.0;
