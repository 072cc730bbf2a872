//! # Dashboard Composition
//!
//! Runs one full aggregation pass over one fetched snapshot of records
//! and returns everything the presentation layer renders.
//!
//! ## One Pass, One Axis
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Dashboard::compute                                │
//! │                                                                         │
//! │  transactions ─┐                                                        │
//! │  products ─────┼─► enrich once ─► SaleWithCost records                 │
//! │                │        │                                               │
//! │                │        ├─► aggregate ──► AggregatedStats              │
//! │                │        ├─► rank ───────► ProductRankings              │
//! │  invoices ─────┼────────┴─► chart_series ► ChartSeries                 │
//! │                └──────────► invoice_stats ► InvoiceStats               │
//! │                                                                         │
//! │  `now` is captured once by the caller, so every series of the pass     │
//! │  shares one immutable bucket axis.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::aggregate::{aggregate_enriched, enrich_period_sales};
use crate::invoice::{invoice_stats, InvoiceStats};
use crate::period::Period;
use crate::ranking::{rank, ProductRankings};
use crate::series::{chart_series, ChartSeries};
use crate::types::{AggregatedStats, Invoice, Product, Transaction};

// =============================================================================
// Dashboard
// =============================================================================

/// The complete output of one aggregation pass. Idempotent: identical
/// inputs produce an identical dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dashboard {
    /// The period this pass covered.
    pub period: Period,

    /// Headline scalar KPIs.
    pub stats: AggregatedStats,

    /// Ranked and bucketed product views.
    pub rankings: ProductRankings,

    /// Purchases-vs-sales chart series on a shared axis.
    pub series: ChartSeries,

    /// Supplier invoice KPIs.
    pub invoices: InvoiceStats,
}

impl Dashboard {
    /// Computes a full dashboard from one snapshot of raw records.
    pub fn compute(
        period: Period,
        now: DateTime<Utc>,
        transactions: &[Transaction],
        products: &[Product],
        invoices: &[Invoice],
    ) -> Dashboard {
        let sales = enrich_period_sales(transactions, products, period, now);

        Dashboard {
            period,
            stats: aggregate_enriched(&sales, invoices, period, now),
            rankings: rank(&sales, products),
            series: chart_series(&sales, invoices, period, now),
            invoices: invoice_stats(invoices, period, now),
        }
    }

    /// The fully-zeroed dashboard for a pass that could not run: every
    /// value zero, every ranked list empty, but the bucket axis intact so
    /// charts keep their shape.
    pub fn zeroed(period: Period, now: DateTime<Utc>) -> Dashboard {
        Dashboard {
            period,
            stats: AggregatedStats::default(),
            rankings: ProductRankings::default(),
            series: chart_series(&[], &[], period, now),
            invoices: InvoiceStats::default(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
