//! # Canonical Record Types
//!
//! The strictly-typed schema every aggregation function works against.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Record Types                                    │
//! │                                                                         │
//! │  INPUTS (read-only, normalized upstream by pulse-source)               │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Transaction    │   │    Invoice      │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  id             │   │  id             │       │
//! │  │  quantity       │   │  vendor_name    │   │  cost_price?    │       │
//! │  │  total_price    │   │  total_amount   │   │  selling_price? │       │
//! │  │  timestamp      │   │  status         │   │  quantity_on_   │       │
//! │  └─────────────────┘   │  created_at     │   │    hand         │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  DERIVED (recomputed every pass, never persisted)                      │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌──────────────────┐     │
//! │  │  SaleWithCost   │──►│ ProductAggregate │──►│ AggregatedStats  │     │
//! │  │  + unit cost    │   │  per-product     │   │  period-level    │     │
//! │  │  + provenance   │   │  rollup          │   │  KPIs            │     │
//! │  └─────────────────┘   └──────────────────┘   └──────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sign Convention
//! All currency *inputs* are non-negative. Derived profit and margin values
//! are signed: a loss stays negative all the way to the frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Rounding
// =============================================================================

/// Rounds a currency or percentage value to 2 decimal places.
///
/// Applied only at the point of exposure. Intermediate accumulation stays
/// unrounded so cent-level errors cannot compound across thousands of
/// records.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Transaction
// =============================================================================

/// A completed sale. Immutable once recorded; created externally and
/// consumed read-only by this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    /// Catalog ID of the product sold.
    pub product_id: String,

    /// Product name at time of sale (used for display grouping).
    pub product_name: String,

    /// Units sold (>= 0).
    pub quantity: i64,

    /// Price per unit at time of sale.
    pub unit_price: f64,

    /// Total charged for the line (unit_price × quantity, as recorded).
    pub total_price: f64,

    /// When the sale completed.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Invoice
// =============================================================================

/// Processing state of a supplier invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Received but not yet picked up for processing.
    Pending,
    /// Currently being processed.
    Processing,
    /// Fully processed (wire values "completed" and "success").
    Completed,
    /// Processing failed (wire values "failed" and "error").
    Failed,
}

impl InvoiceStatus {
    /// True for invoices that count toward the success rate.
    #[inline]
    pub const fn is_processed(&self) -> bool {
        matches!(self, InvoiceStatus::Completed)
    }

    /// True for invoices still waiting to be processed.
    #[inline]
    pub const fn is_pending(&self) -> bool {
        matches!(self, InvoiceStatus::Pending)
    }
}

/// A supplier purchase record. Read-only to this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Invoice {
    /// Unique identifier assigned by the upstream system.
    pub id: String,

    /// Supplier the invoice was received from.
    pub vendor_name: String,

    /// Amount paid to the supplier.
    pub total_amount: f64,

    /// Current processing state.
    pub status: InvoiceStatus,

    /// When the invoice was recorded. Period filtering and time-series
    /// binning key on this field.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When processing finished, if it has.
    #[ts(as = "Option<String>")]
    pub finalized_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product. Read-only to this engine; the authoritative cost
/// source when `cost_price` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Catalog category.
    pub category: String,

    /// Per-unit cost. Missing for products whose supplier cost was never
    /// entered; the cost resolver estimates those.
    pub cost_price: Option<f64>,

    /// Current per-unit selling price.
    pub selling_price: Option<f64>,

    /// Units currently in stock.
    pub quantity_on_hand: i64,
}

// =============================================================================
// Sale With Cost (derived)
// =============================================================================

/// A transaction enriched with its resolved unit cost and per-line
/// profitability. Ephemeral: recomputed on every aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithCost {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub total_price: f64,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// Per-unit cost resolved by the cost resolver.
    pub unit_cost: f64,

    /// `unit_cost × quantity`.
    pub total_cost: f64,

    /// `total_price − total_cost`. Signed; negative means the line sold
    /// at a loss.
    pub profit: f64,

    /// `profit / total_price × 100`, or 0 when the line has no revenue.
    pub margin_percent: f64,

    /// True when the cost came from the product catalog rather than a
    /// heuristic estimate.
    pub cost_is_actual: bool,
}

// =============================================================================
// Product Aggregate (derived)
// =============================================================================

/// Per-product rollup of every enriched sale in the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductAggregate {
    /// Product display name (grouping key, case-sensitive).
    pub name: String,

    /// Units sold across all transactions.
    pub units: i64,

    /// Revenue across all transactions.
    pub revenue: f64,

    /// Resolved cost across all transactions.
    pub cost: f64,

    /// `revenue − cost`. Signed.
    pub profit: f64,

    /// Number of transactions rolled up.
    pub transaction_count: i64,

    /// `profit / revenue × 100` over the rollup, or 0 without revenue.
    pub average_margin_percent: f64,

    /// True if ANY constituent sale had a catalog-sourced cost.
    pub has_actual_cost: bool,
}

// =============================================================================
// Aggregated Stats (derived)
// =============================================================================

/// Period-level scalar KPIs: the engine's headline output.
///
/// All monetary and percentage fields are rounded to 2 decimal places at
/// construction (the point of exposure). `Default` is the fully-zeroed
/// stats block used when a pass cannot run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AggregatedStats {
    /// Σ total_price over period transactions.
    pub revenue: f64,

    /// Σ resolved total_cost over period transactions.
    pub total_cost: f64,

    /// `revenue − total_cost`.
    pub gross_profit: f64,

    /// `revenue × OPERATING_EXPENSE_RATE`.
    pub operating_expenses: f64,

    /// `gross_profit − operating_expenses`.
    pub net_profit: f64,

    /// Σ quantity over period transactions.
    pub units: i64,

    /// Number of period transactions.
    pub transaction_count: i64,

    /// `revenue / transaction_count`, or 0 with no transactions.
    pub average_order_value: f64,

    /// `gross_profit / revenue × 100`, or 0 with no revenue.
    pub gross_margin_percent: f64,

    /// `net_profit / revenue × 100`, or 0 with no revenue.
    pub net_margin_percent: f64,

    /// Σ invoice total_amount over the independently-filtered invoice set.
    pub total_invoiced: f64,

    /// `(revenue − total_invoiced) / total_invoiced × 100`, or 0 when
    /// nothing was invoiced. A procurement-spend proxy, not accounting ROI.
    pub roi_percent: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(10.006), 10.01);
        assert_eq!(round2(10.004), 10.0);
        assert_eq!(round2(123.456789), 123.46);
        assert_eq!(round2(-3.336), -3.34);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_invoice_status_helpers() {
        assert!(InvoiceStatus::Completed.is_processed());
        assert!(!InvoiceStatus::Pending.is_processed());
        assert!(!InvoiceStatus::Processing.is_processed());
        assert!(!InvoiceStatus::Failed.is_processed());

        assert!(InvoiceStatus::Pending.is_pending());
        assert!(!InvoiceStatus::Processing.is_pending());
    }

    #[test]
    fn test_aggregated_stats_default_is_zeroed() {
        let stats = AggregatedStats::default();
        assert_eq!(stats.revenue, 0.0);
        assert_eq!(stats.net_profit, 0.0);
        assert_eq!(stats.units, 0);
        assert_eq!(stats.transaction_count, 0);
        assert_eq!(stats.roi_percent, 0.0);
    }
}
