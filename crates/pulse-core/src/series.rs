//! # Time-Series Binner
//!
//! Assigns dated records into the period's buckets to build the parallel
//! purchases-vs-sales series the dashboard charts.
//!
//! ## Shared X-Axis
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   labels:     Mon    Tue    Wed    Thu    Fri    Sat    Sun            │
//! │   sales:     420.0  310.5    0.0  960.0  123.4    0.0    0.0          │
//! │   purchases: 200.0    0.0  150.0    0.0    0.0    0.0    0.0          │
//! │                                                                         │
//! │   Both series come from the SAME pass's bucket axis, so they are       │
//! │   directly comparable point by point.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A record whose date falls outside every bucket is dropped, never
//! clipped into a boundary bucket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::period::Period;
use crate::types::{round2, Invoice, SaleWithCost};

// =============================================================================
// Chart Series
// =============================================================================

/// The chart-ready output of one pass: one label per bucket and one value
/// per label in each series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChartSeries {
    /// Bucket labels: the x-axis.
    pub labels: Vec<String>,

    /// Σ sale total_price per bucket.
    pub sales: Vec<f64>,

    /// Σ invoice total_amount per bucket.
    pub purchases: Vec<f64>,
}

// =============================================================================
// Binning
// =============================================================================

/// Sums `value_of(record)` into the bucket containing `date_of(record)`,
/// producing one scalar per bucket label. Bucket sums round at exposure.
pub fn bin<T>(
    records: &[T],
    period: Period,
    now: DateTime<Utc>,
    date_of: impl Fn(&T) -> DateTime<Utc>,
    value_of: impl Fn(&T) -> f64,
) -> Vec<f64> {
    let mut buckets = vec![0.0f64; period.bucket_count(now)];

    for record in records {
        if let Some(index) = period.bucket_index(date_of(record), now) {
            buckets[index] += value_of(record);
        }
    }

    for value in &mut buckets {
        *value = round2(*value);
    }
    buckets
}

/// Builds the comparable purchases and sales series for one pass.
///
/// `sales` are the pass's enriched transactions; `invoices` are binned on
/// `created_at` without pre-filtering; the binner drops anything outside
/// the bucket axis.
pub fn chart_series(
    sales: &[SaleWithCost],
    invoices: &[Invoice],
    period: Period,
    now: DateTime<Utc>,
) -> ChartSeries {
    ChartSeries {
        labels: period.bucket_labels(now),
        sales: bin(sales, period, now, |sale| sale.timestamp, |sale| sale.total_price),
        purchases: bin(
            invoices,
            period,
            now,
            |invoice| invoice.created_at,
            |invoice| invoice.total_amount,
        ),
    }
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

    fn sale_at(ts: DateTime<Utc>, total_price: f64) -> SaleWithCost {
        SaleWithCost {
            product_id: "P1".to_string(),
            product_name: "Latte".to_string(),
            quantity: 1,
            total_price,
            timestamp: ts,
            unit_cost: 1.0,
            total_cost: 1.0,
            profit: total_price - 1.0,
            margin_percent: 0.0,
            cost_is_actual: true,
        }
    }

    fn invoice_at(ts: DateTime<Utc>, total_amount: f64) -> Invoice {
        Invoice {
            id: "INV".to_string(),
            vendor_name: "Acme Supply".to_string(),
            total_amount,
            status: InvoiceStatus::Completed,
            created_at: ts,
            finalized_at: None,
        }
    }

    #[test]
    fn test_all_series_share_one_axis_length() {
        for period in [
            Period::Today,
            Period::Week,
            Period::Month,
            Period::Year,
            Period::All,
        ] {
            let series = chart_series(&[], &[], period, now());
            assert_eq!(series.labels.len(), series.sales.len());
            assert_eq!(series.labels.len(), series.purchases.len());
            assert_eq!(series.labels.len(), period.bucket_count(now()));
        }
    }

    #[test]
    fn test_hourly_placement_for_today() {
        let sales = [
            sale_at(Utc.with_ymd_and_hms(2026, 8, 7, 0, 5, 0).unwrap(), 10.0),
            sale_at(Utc.with_ymd_and_hms(2026, 8, 7, 9, 30, 0).unwrap(), 20.0),
            sale_at(Utc.with_ymd_and_hms(2026, 8, 7, 9, 45, 0).unwrap(), 5.0),
            sale_at(Utc.with_ymd_and_hms(2026, 8, 7, 23, 59, 59).unwrap(), 7.5),
        ];

        let series = chart_series(&sales, &[], Period::Today, now());
        assert_eq!(series.sales[0], 10.0);
        assert_eq!(series.sales[9], 25.0);
        assert_eq!(series.sales[23], 7.5);
        assert_eq!(series.sales.iter().filter(|v| **v > 0.0).count(), 3);
    }

    #[test]
    fn test_bucket_sums_add_up_to_revenue() {
        // Sales scattered across the week; Σ buckets == Σ total_price
        let sales: Vec<SaleWithCost> = (3..10)
            .map(|day| sale_at(Utc.with_ymd_and_hms(2026, 8, day, 12, 0, 0).unwrap(), day as f64 * 1.25))
            .collect();
        let revenue: f64 = sales.iter().map(|s| s.total_price).sum();

        let binned = bin(&sales, Period::Week, now(), |s| s.timestamp, |s| s.total_price);
        let total: f64 = binned.iter().sum();
        assert!((total - revenue).abs() < 0.01 * binned.len() as f64);
    }

    #[test]
    fn test_out_of_window_records_are_dropped_not_clipped() {
        let sales = [
            sale_at(Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap(), 100.0), // Sunday before
            sale_at(Utc.with_ymd_and_hms(2026, 8, 10, 0, 0, 0).unwrap(), 100.0), // next Monday
        ];

        let binned = bin(&sales, Period::Week, now(), |s| s.timestamp, |s| s.total_price);
        assert!(binned.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_purchases_bin_on_invoice_creation() {
        let invoices = [
            invoice_at(Utc.with_ymd_and_hms(2026, 8, 3, 8, 0, 0).unwrap(), 200.0), // Monday
            invoice_at(Utc.with_ymd_and_hms(2026, 8, 5, 8, 0, 0).unwrap(), 150.0), // Wednesday
            invoice_at(Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap(), 999.0), // July: dropped
        ];

        let series = chart_series(&[], &invoices, Period::Week, now());
        assert_eq!(series.purchases[0], 200.0);
        assert_eq!(series.purchases[2], 150.0);
        let total: f64 = series.purchases.iter().sum();
        assert_eq!(total, 350.0);
    }

    #[test]
    fn test_all_period_charts_fall_back_to_year_buckets() {
        let sales = [
            sale_at(Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap(), 40.0),
            sale_at(Utc.with_ymd_and_hms(2020, 3, 14, 12, 0, 0).unwrap(), 999.0), // old year: charted nowhere
        ];

        let binned = bin(&sales, Period::All, now(), |s| s.timestamp, |s| s.total_price);
        assert_eq!(binned.len(), 12);
        assert_eq!(binned[2], 40.0);
        let total: f64 = binned.iter().sum();
        assert_eq!(total, 40.0);
    }
}
