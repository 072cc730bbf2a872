//! # Cost Resolver
//!
//! Determines a per-unit cost for a sale under incomplete catalog data.
//!
//! ## Resolution Policy (strict priority order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cost Resolution Ladder                             │
//! │                                                                         │
//! │  1. Catalog cost price present?                                        │
//! │     └─► use it                                  is_actual = true       │
//! │                                                                         │
//! │  2. Catalog selling price present?                                     │
//! │     └─► 60% of selling price                    is_actual = false      │
//! │         (assumes a 40% nominal margin)                                 │
//! │                                                                         │
//! │  3. Last resort: the sale's own unit price                             │
//! │     └─► 60% of (total_price / quantity)         is_actual = false      │
//! │         quantity 0 ─► cost 0 (nothing to estimate from)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The resolver runs exactly once per transaction per aggregation pass.
//! The `is_actual` flag propagates to the product rollup's
//! `has_actual_cost` via logical OR, so the frontend can badge figures
//! that rest on estimates.

use crate::types::{Product, SaleWithCost, Transaction};
use crate::ESTIMATED_COST_RATE;

// =============================================================================
// Resolved Cost
// =============================================================================

/// A per-unit cost together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCost {
    /// Cost of one unit.
    pub unit_cost: f64,

    /// True when the cost came from the product catalog; false for every
    /// heuristic estimate.
    pub is_actual: bool,
}

/// Resolves the per-unit cost of a sale.
///
/// `product` is the catalog entry matching `transaction.product_id`, or
/// `None` when the sale references a product no longer in the catalog;
/// that case falls through to the self-referential estimate.
pub fn resolve_unit_cost(transaction: &Transaction, product: Option<&Product>) -> ResolvedCost {
    if let Some(cost_price) = product.and_then(|p| p.cost_price) {
        return ResolvedCost {
            unit_cost: cost_price,
            is_actual: true,
        };
    }

    if let Some(selling_price) = product.and_then(|p| p.selling_price) {
        return ResolvedCost {
            unit_cost: ESTIMATED_COST_RATE * selling_price,
            is_actual: false,
        };
    }

    // Self-referential estimate from the sale itself. A zero-quantity
    // line has no unit price to estimate from; its cost stays 0 and its
    // margin is meaningless (the per-line margin guard handles that).
    let unit_cost = if transaction.quantity > 0 {
        ESTIMATED_COST_RATE * (transaction.total_price / transaction.quantity as f64)
    } else {
        0.0
    };

    ResolvedCost {
        unit_cost,
        is_actual: false,
    }
}

// =============================================================================
// Sale Enrichment
// =============================================================================

impl SaleWithCost {
    /// Enriches a transaction with its resolved cost and per-line
    /// profitability figures.
    pub fn resolve(transaction: &Transaction, product: Option<&Product>) -> SaleWithCost {
        let ResolvedCost {
            unit_cost,
            is_actual,
        } = resolve_unit_cost(transaction, product);

        let total_cost = unit_cost * transaction.quantity as f64;
        let profit = transaction.total_price - total_cost;
        let margin_percent = if transaction.total_price > 0.0 {
            profit / transaction.total_price * 100.0
        } else {
            0.0
        };

        // No rounding here: enriched sales feed accumulation downstream,
        // and only exposure points round (see types::round2).
        SaleWithCost {
            product_id: transaction.product_id.clone(),
            product_name: transaction.product_name.clone(),
            quantity: transaction.quantity,
            total_price: transaction.total_price,
            timestamp: transaction.timestamp,
            unit_cost,
            total_cost,
            profit,
            margin_percent,
            cost_is_actual: is_actual,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sale(quantity: i64, total_price: f64) -> Transaction {
        Transaction {
            product_id: "P1".to_string(),
            product_name: "Espresso Beans".to_string(),
            quantity,
            unit_price: if quantity > 0 {
                total_price / quantity as f64
            } else {
                0.0
            },
            total_price,
            timestamp: Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap(),
        }
    }

    fn product(cost_price: Option<f64>, selling_price: Option<f64>) -> Product {
        Product {
            id: "P1".to_string(),
            name: "Espresso Beans".to_string(),
            category: "Coffee".to_string(),
            cost_price,
            selling_price,
            quantity_on_hand: 40,
        }
    }

    #[test]
    fn test_catalog_cost_wins() {
        let resolved = resolve_unit_cost(&sale(2, 100.0), Some(&product(Some(30.0), Some(50.0))));
        assert_eq!(resolved.unit_cost, 30.0);
        assert!(resolved.is_actual);
    }

    #[test]
    fn test_selling_price_fallback_is_estimated() {
        let resolved = resolve_unit_cost(&sale(2, 100.0), Some(&product(None, Some(50.0))));
        assert_eq!(resolved.unit_cost, 30.0);
        assert!(!resolved.is_actual);
    }

    #[test]
    fn test_self_referential_estimate() {
        // No catalog data at all: 60% of the sale's own unit price
        let resolved = resolve_unit_cost(&sale(2, 100.0), Some(&product(None, None)));
        assert_eq!(resolved.unit_cost, 30.0);
        assert!(!resolved.is_actual);

        // Sale referencing a product that left the catalog
        let resolved = resolve_unit_cost(&sale(4, 100.0), None);
        assert_eq!(resolved.unit_cost, 15.0);
        assert!(!resolved.is_actual);
    }

    #[test]
    fn test_zero_quantity_costs_nothing() {
        let resolved = resolve_unit_cost(&sale(0, 100.0), None);
        assert_eq!(resolved.unit_cost, 0.0);
        assert!(!resolved.is_actual);
    }

    #[test]
    fn test_enrichment_figures() {
        let enriched = SaleWithCost::resolve(&sale(2, 100.0), Some(&product(Some(30.0), Some(50.0))));
        assert_eq!(enriched.unit_cost, 30.0);
        assert_eq!(enriched.total_cost, 60.0);
        assert_eq!(enriched.profit, 40.0);
        assert_eq!(enriched.margin_percent, 40.0);
        assert!(enriched.cost_is_actual);
    }

    #[test]
    fn test_loss_line_keeps_its_sign() {
        let enriched = SaleWithCost::resolve(&sale(2, 40.0), Some(&product(Some(30.0), None)));
        assert_eq!(enriched.total_cost, 60.0);
        assert_eq!(enriched.profit, -20.0);
        assert_eq!(enriched.margin_percent, -50.0);
    }

    #[test]
    fn test_zero_revenue_line_has_zero_margin() {
        let enriched = SaleWithCost::resolve(&sale(0, 0.0), None);
        assert_eq!(enriched.margin_percent, 0.0);
        assert_eq!(enriched.profit, 0.0);
    }
}
