//! # Product Ranking & Margin Classifier
//!
//! Rolls enriched sales up per product and produces the ranked and
//! bucketed views the dashboard's product panels render.
//!
//! ## Outputs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Product Views                                       │
//! │                                                                         │
//! │  top_by_revenue   top 5 rollups, revenue descending                    │
//! │  top_by_profit    top 5 rollups, profit descending                     │
//! │  low_margin       revenue > 0 AND margin < 20%, worst first, top 5     │
//! │                                                                         │
//! │  margin_histogram (over the CATALOG, not the period's sales)           │
//! │    loss       margin <  0%                                             │
//! │    low         0% ≤ margin < 20%                                       │
//! │    ok         20% ≤ margin < 30%                                       │
//! │    good       30% ≤ margin < 40%                                       │
//! │    excellent  margin ≥ 40%                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Grouping is by product name, case-sensitive. Sorts are stable, so
//! products tied on the sort key keep their first-seen order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::types::{round2, Product, ProductAggregate, SaleWithCost};
use crate::{LOW_MARGIN_THRESHOLD_PERCENT, TOP_PRODUCT_LIMIT};

// =============================================================================
// Margin Bands
// =============================================================================

/// Disjoint catalog-margin classification bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MarginBand {
    /// Selling below cost.
    Loss,
    /// 0% ≤ margin < 20%.
    Low,
    /// 20% ≤ margin < 30%.
    Ok,
    /// 30% ≤ margin < 40%.
    Good,
    /// Margin ≥ 40%.
    Excellent,
}

impl MarginBand {
    /// Classifies a margin percentage into its band.
    pub fn classify(margin_percent: f64) -> MarginBand {
        if margin_percent < 0.0 {
            MarginBand::Loss
        } else if margin_percent < 20.0 {
            MarginBand::Low
        } else if margin_percent < 30.0 {
            MarginBand::Ok
        } else if margin_percent < 40.0 {
            MarginBand::Good
        } else {
            MarginBand::Excellent
        }
    }
}

/// Catalog-wide margin distribution. Counts products, not sales.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarginHistogram {
    pub loss: i64,
    pub low: i64,
    pub ok: i64,
    pub good: i64,
    pub excellent: i64,
}

impl MarginHistogram {
    fn record(&mut self, band: MarginBand) {
        match band {
            MarginBand::Loss => self.loss += 1,
            MarginBand::Low => self.low += 1,
            MarginBand::Ok => self.ok += 1,
            MarginBand::Good => self.good += 1,
            MarginBand::Excellent => self.excellent += 1,
        }
    }

    /// Number of classified products.
    pub fn total(&self) -> i64 {
        self.loss + self.low + self.ok + self.good + self.excellent
    }
}

// =============================================================================
// Product Rankings
// =============================================================================

/// The ranked and bucketed product views for one aggregation pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRankings {
    /// Top sellers by revenue, descending.
    pub top_by_revenue: Vec<ProductAggregate>,

    /// Top earners by profit, descending.
    pub top_by_profit: Vec<ProductAggregate>,

    /// Products earning revenue at a thin margin, worst first.
    pub low_margin: Vec<ProductAggregate>,

    /// Catalog margin distribution.
    pub margin_histogram: MarginHistogram,
}

/// Builds every product view from one pass's enriched sales and the
/// product catalog.
pub fn rank(sales: &[SaleWithCost], products: &[Product]) -> ProductRankings {
    let aggregates = roll_up(sales);

    let mut top_by_revenue = aggregates.clone();
    top_by_revenue.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    top_by_revenue.truncate(TOP_PRODUCT_LIMIT);

    let mut top_by_profit = aggregates.clone();
    top_by_profit.sort_by(|a, b| b.profit.total_cmp(&a.profit));
    top_by_profit.truncate(TOP_PRODUCT_LIMIT);

    let mut low_margin: Vec<ProductAggregate> = aggregates
        .into_iter()
        .filter(|agg| agg.revenue > 0.0 && agg.average_margin_percent < LOW_MARGIN_THRESHOLD_PERCENT)
        .collect();
    low_margin.sort_by(|a, b| a.average_margin_percent.total_cmp(&b.average_margin_percent));
    low_margin.truncate(TOP_PRODUCT_LIMIT);

    ProductRankings {
        top_by_revenue,
        top_by_profit,
        low_margin,
        margin_histogram: margin_histogram(products),
    }
}

/// Groups enriched sales by product name (first-seen order) and sums each
/// group into a [`ProductAggregate`].
fn roll_up(sales: &[SaleWithCost]) -> Vec<ProductAggregate> {
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut aggregates: Vec<ProductAggregate> = Vec::new();

    for sale in sales {
        let index = *order.entry(sale.product_name.as_str()).or_insert_with(|| {
            aggregates.push(ProductAggregate {
                name: sale.product_name.clone(),
                units: 0,
                revenue: 0.0,
                cost: 0.0,
                profit: 0.0,
                transaction_count: 0,
                average_margin_percent: 0.0,
                has_actual_cost: false,
            });
            aggregates.len() - 1
        });

        let agg = &mut aggregates[index];
        agg.units += sale.quantity;
        agg.revenue += sale.total_price;
        agg.cost += sale.total_cost;
        agg.profit += sale.profit;
        agg.transaction_count += 1;
        agg.has_actual_cost |= sale.cost_is_actual;
    }

    // Finalize: ratio over the summed figures, then round for exposure.
    for agg in &mut aggregates {
        agg.average_margin_percent = if agg.revenue > 0.0 {
            round2(agg.profit / agg.revenue * 100.0)
        } else {
            0.0
        };
        agg.revenue = round2(agg.revenue);
        agg.cost = round2(agg.cost);
        agg.profit = round2(agg.profit);
    }

    aggregates
}

/// Classifies every catalog product carrying both prices into its margin
/// band. Products missing either price (or with a non-positive
/// selling price, where the ratio is undefined) are left out entirely.
pub fn margin_histogram(products: &[Product]) -> MarginHistogram {
    let mut histogram = MarginHistogram::default();

    for product in products {
        let (Some(cost), Some(selling)) = (product.cost_price, product.selling_price) else {
            continue;
        };
        if selling <= 0.0 {
            continue;
        }
        let margin = (selling - cost) / selling * 100.0;
        histogram.record(MarginBand::classify(margin));
    }

    histogram
}

// =============================================================================
// Unit Tests
// =============================================================================
