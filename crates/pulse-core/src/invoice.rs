//! # Invoice Analytics
//!
//! Period-filtered supplier invoice statistics: counts by processing
//! state, success rate, and aggregate value.
//!
//! The filter window is the same one the sales aggregator uses, applied
//! to `created_at`. Invoices outside the period contribute to nothing;
//! the success rate is computed over the period's invoices only, never
//! over every invoice ever recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::period::Period;
use crate::types::{round2, Invoice};

// =============================================================================
// Invoice Stats
// =============================================================================

/// Supplier invoice KPIs for one period.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceStats {
    /// Invoices recorded in the period.
    pub total_invoices: i64,

    /// Invoices fully processed (status `completed`).
    pub processed_invoices: i64,

    /// Invoices still waiting (status `pending`).
    pub pending_invoices: i64,

    /// `processed / total × 100`, or 0 with no invoices in the period.
    pub success_rate_percent: f64,

    /// Σ total_amount over the period's invoices.
    pub total_value: f64,
}

/// Computes invoice KPIs over the period window.
pub fn invoice_stats(invoices: &[Invoice], period: Period, now: DateTime<Utc>) -> InvoiceStats {
    let window = period.window(now);

    let mut total_invoices: i64 = 0;
    let mut processed_invoices: i64 = 0;
    let mut pending_invoices: i64 = 0;
    let mut total_value = 0.0;

    for invoice in invoices.iter().filter(|i| window.contains(i.created_at)) {
        total_invoices += 1;
        if invoice.status.is_processed() {
            processed_invoices += 1;
        }
        if invoice.status.is_pending() {
            pending_invoices += 1;
        }
        total_value += invoice.total_amount;
    }

    let success_rate_percent = if total_invoices > 0 {
        processed_invoices as f64 / total_invoices as f64 * 100.0
    } else {
        0.0
    };

    InvoiceStats {
        total_invoices,
        processed_invoices,
        pending_invoices,
        success_rate_percent: round2(success_rate_percent),
        total_value: round2(total_value),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
