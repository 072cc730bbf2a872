//! # Sales Aggregator
//!
//! Combines transactions, products, and invoices over one period into the
//! scalar KPI block the dashboard headlines.
//!
//! ## One Aggregation Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Aggregation Pipeline                               │
//! │                                                                         │
//! │  transactions ──► window filter ──► cost resolver ──► SaleWithCost     │
//! │                   [start, end)      (once per tx)                      │
//! │                                          │                              │
//! │                                          ▼                              │
//! │  revenue = Σ total_price      gross_profit  = revenue − total_cost     │
//! │  units   = Σ quantity         net_profit    = gross − revenue × 15%    │
//! │  total_cost = Σ line cost     margins, average order value             │
//! │                                                                         │
//! │  invoices ──► window filter (independent set: money paid to            │
//! │               suppliers, not sale timestamps)                          │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  total_invoiced = Σ total_amount                                       │
//! │  roi_percent = (revenue − total_invoiced) / total_invoiced × 100       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Accumulation is unrounded; every figure rounds to 2 decimals exactly
//! once, when the `AggregatedStats` block is built.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::period::Period;
use crate::types::{round2, AggregatedStats, Invoice, Product, SaleWithCost, Transaction};
use crate::OPERATING_EXPENSE_RATE;

// =============================================================================
// Enrichment
// =============================================================================

/// Filters transactions to the period window and enriches each survivor
/// with its resolved cost. The resolver runs exactly once per transaction
/// per pass; rankings and series reuse the returned records.
pub fn enrich_period_sales(
    transactions: &[Transaction],
    products: &[Product],
    period: Period,
    now: DateTime<Utc>,
) -> Vec<SaleWithCost> {
    let window = period.window(now);
    let catalog: HashMap<&str, &Product> =
        products.iter().map(|p| (p.id.as_str(), p)).collect();

    transactions
        .iter()
        .filter(|tx| window.contains(tx.timestamp))
        .map(|tx| SaleWithCost::resolve(tx, catalog.get(tx.product_id.as_str()).copied()))
        .collect()
}

// =============================================================================
// Aggregation
// =============================================================================

/// Aggregates already-enriched sales plus the independently-filtered
/// invoice set into the period KPI block.
pub fn aggregate_enriched(
    sales: &[SaleWithCost],
    invoices: &[Invoice],
    period: Period,
    now: DateTime<Utc>,
) -> AggregatedStats {
    let mut revenue = 0.0;
    let mut total_cost = 0.0;
    let mut units: i64 = 0;

    for sale in sales {
        revenue += sale.total_price;
        total_cost += sale.total_cost;
        units += sale.quantity;
    }

    let transaction_count = sales.len() as i64;
    let gross_profit = revenue - total_cost;
    let operating_expenses = revenue * OPERATING_EXPENSE_RATE;
    let net_profit = gross_profit - operating_expenses;

    let gross_margin_percent = if revenue > 0.0 {
        gross_profit / revenue * 100.0
    } else {
        0.0
    };
    let net_margin_percent = if revenue > 0.0 {
        net_profit / revenue * 100.0
    } else {
        0.0
    };
    let average_order_value = if transaction_count > 0 {
        revenue / transaction_count as f64
    } else {
        0.0
    };

    // Invoices are filtered against the same window but form their own
    // set: they represent money paid to suppliers, not sale timestamps.
    let window = period.window(now);
    let total_invoiced: f64 = invoices
        .iter()
        .filter(|invoice| window.contains(invoice.created_at))
        .map(|invoice| invoice.total_amount)
        .sum();

    let roi_percent = if total_invoiced > 0.0 {
        (revenue - total_invoiced) / total_invoiced * 100.0
    } else {
        0.0
    };

    AggregatedStats {
        revenue: round2(revenue),
        total_cost: round2(total_cost),
        gross_profit: round2(gross_profit),
        operating_expenses: round2(operating_expenses),
        net_profit: round2(net_profit),
        units,
        transaction_count,
        average_order_value: round2(average_order_value),
        gross_margin_percent: round2(gross_margin_percent),
        net_margin_percent: round2(net_margin_percent),
        total_invoiced: round2(total_invoiced),
        roi_percent: round2(roi_percent),
    }
}

/// Full aggregation from raw records: filter, resolve costs, aggregate.
pub fn aggregate(
    transactions: &[Transaction],
    products: &[Product],
    invoices: &[Invoice],
    period: Period,
    now: DateTime<Utc>,
) -> AggregatedStats {
    let sales = enrich_period_sales(transactions, products, period, now);
    aggregate_enriched(&sales, invoices, period, now)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvoiceStatus;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, 15, 0, 0).unwrap()
    }

    fn transaction(product_id: &str, quantity: i64, total_price: f64) -> Transaction {
        Transaction {
            product_id: product_id.to_string(),
            product_name: format!("Product {product_id}"),
            quantity,
            unit_price: if quantity > 0 {
                total_price / quantity as f64
            } else {
                0.0
            },
            total_price,
            timestamp: Utc.with_ymd_and_hms(2026, 8, 7, 10, 30, 0).unwrap(),
        }
    }

    fn product(id: &str, cost_price: Option<f64>, selling_price: Option<f64>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            category: "General".to_string(),
            cost_price,
            selling_price,
            quantity_on_hand: 10,
        }
    }

    fn invoice(total_amount: f64, created_at: DateTime<Utc>) -> Invoice {
        Invoice {
            id: "INV-1".to_string(),
            vendor_name: "Acme Supply".to_string(),
            total_amount,
            status: InvoiceStatus::Completed,
            created_at,
            finalized_at: Some(created_at),
        }
    }

    #[test]
    fn test_reference_scenario() {
        // One sale: 2 units for 100.00, catalog cost 30.00/unit.
        let transactions = [transaction("P1", 2, 100.0)];
        let products = [product("P1", Some(30.0), Some(50.0))];

        let stats = aggregate(&transactions, &products, &[], Period::Today, now());

        assert_eq!(stats.revenue, 100.0);
        assert_eq!(stats.total_cost, 60.0);
        assert_eq!(stats.gross_profit, 40.0);
        assert_eq!(stats.gross_margin_percent, 40.0);
        assert_eq!(stats.operating_expenses, 15.0);
        assert_eq!(stats.net_profit, 25.0);
        assert_eq!(stats.net_margin_percent, 25.0);
        assert_eq!(stats.units, 2);
        assert_eq!(stats.transaction_count, 1);
        assert_eq!(stats.average_order_value, 100.0);
    }

    #[test]
    fn test_gross_profit_identity() {
        let transactions = [
            transaction("P1", 2, 100.0),
            transaction("P2", 1, 25.5),
            transaction("P1", 3, 150.0),
        ];
        let products = [
            product("P1", Some(30.0), None),
            product("P2", Some(10.25), None),
        ];

        let stats = aggregate(&transactions, &products, &[], Period::Today, now());
        assert_eq!(stats.gross_profit, stats.revenue - stats.total_cost);
    }

    #[test]
    fn test_roi_is_zero_without_invoices() {
        let transactions = [transaction("P1", 2, 100.0)];
        let products = [product("P1", Some(30.0), None)];

        let stats = aggregate(&transactions, &products, &[], Period::Today, now());
        assert_eq!(stats.roi_percent, 0.0);
        assert_eq!(stats.total_invoiced, 0.0);
    }

    #[test]
    fn test_roi_against_period_invoices_only() {
        let transactions = [transaction("P1", 2, 100.0)];
        let products = [product("P1", Some(30.0), None)];
        let invoices = [
            invoice(50.0, Utc.with_ymd_and_hms(2026, 8, 7, 8, 0, 0).unwrap()),
            // Outside today's window: must not count
            invoice(999.0, Utc.with_ymd_and_hms(2026, 8, 6, 8, 0, 0).unwrap()),
        ];

        let stats = aggregate(&transactions, &products, &invoices, Period::Today, now());
        assert_eq!(stats.total_invoiced, 50.0);
        assert_eq!(stats.roi_percent, 100.0);
    }

    #[test]
    fn test_transactions_outside_window_are_excluded() {
        let mut old_sale = transaction("P1", 5, 500.0);
        old_sale.timestamp = Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap();
        let transactions = [transaction("P1", 2, 100.0), old_sale];
        let products = [product("P1", Some(30.0), None)];

        let stats = aggregate(&transactions, &products, &[], Period::Today, now());
        assert_eq!(stats.transaction_count, 1);
        assert_eq!(stats.revenue, 100.0);

        // The same records under `all` include both
        let stats = aggregate(&transactions, &products, &[], Period::All, now());
        assert_eq!(stats.transaction_count, 2);
        assert_eq!(stats.revenue, 600.0);
    }

    #[test]
    fn test_empty_inputs_equal_the_zeroed_block() {
        let stats = aggregate(&[], &[], &[], Period::Month, now());
        assert_eq!(stats, AggregatedStats::default());
    }

    #[test]
    fn test_loss_period_stays_signed() {
        // Sold below cost: gross and net profit must stay negative
        let transactions = [transaction("P1", 2, 40.0)];
        let products = [product("P1", Some(30.0), None)];

        let stats = aggregate(&transactions, &products, &[], Period::Today, now());
        assert_eq!(stats.gross_profit, -20.0);
        assert_eq!(stats.gross_margin_percent, -50.0);
        assert!(stats.net_profit < stats.gross_profit);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let transactions = [transaction("P1", 2, 100.0), transaction("P2", 7, 333.33)];
        let products = [product("P1", Some(30.0), None), product("P2", None, Some(47.5))];
        let invoices = [invoice(120.0, Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap())];

        let first = aggregate(&transactions, &products, &invoices, Period::Today, now());
        let second = aggregate(&transactions, &products, &invoices, Period::Today, now());
        assert_eq!(first, second);
    }
}
