//! # Dashboard Engine
//!
//! Drives one aggregation pass: fetch the three record sets concurrently,
//! join, compute, publish.
//!
//! ## Pass Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     compute_dashboard(period)                           │
//! │                                                                         │
//! │  1. Claim the next request generation (atomic increment)               │
//! │                                                                         │
//! │  2. Fetch concurrently over one snapshot:                              │
//! │       transactions(period) ─┐                                          │
//! │       products()           ─┼─ tokio::join!                            │
//! │       recent_invoices()    ─┘                                          │
//! │     Any failure ─► abort the WHOLE pass (state untouched)              │
//! │                                                                         │
//! │  3. Generation still the latest? No ─► discard (Superseded)            │
//! │                                                                         │
//! │  4. Dashboard::compute with `now` captured once                        │
//! │                                                                         │
//! │  5. Publish as latest - unless an even newer pass got there first      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The generation check is what prevents the stale-result race: a pass
//! whose fetches were slow can never overwrite the snapshot of a pass
//! requested after it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use pulse_core::{Dashboard, Period};
use pulse_source::DataSource;

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Dashboard Snapshot
// =============================================================================

/// One published aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Request generation that produced this snapshot. Monotonically
    /// increasing; later passes always carry higher generations.
    pub generation: u64,

    /// When the pass computed (also the `now` its bucket axis used).
    pub computed_at: DateTime<Utc>,

    /// The full dashboard payload.
    pub dashboard: Dashboard,
}

// =============================================================================
// Dashboard Engine
// =============================================================================

/// Computes dashboards from a [`DataSource`], tracking request
/// generations and keeping the last-known-good snapshot.
pub struct DashboardEngine {
    /// Record source (REST in production, fakes in tests).
    source: Arc<dyn DataSource>,

    /// Optional `limit` for the recent-invoices fetch.
    invoice_limit: Option<u32>,

    /// Latest requested generation. Claimed at pass start; compared at
    /// pass end.
    generation: AtomicU64,

    /// Last successfully published snapshot.
    latest: RwLock<Option<DashboardSnapshot>>,
}

impl DashboardEngine {
    /// Creates an engine over the given source.
    pub fn new(source: Arc<dyn DataSource>, invoice_limit: Option<u32>) -> Self {
        DashboardEngine {
            source,
            invoice_limit,
            generation: AtomicU64::new(0),
            latest: RwLock::new(None),
        }
    }

    /// Runs one full aggregation pass for `period`.
    ///
    /// Safe to invoke repeatedly; identical upstream data yields an
    /// identical dashboard. If a newer pass is requested while this one's
    /// fetches are outstanding, this pass returns
    /// [`EngineError::Superseded`] and publishes nothing.
    pub async fn compute_dashboard(&self, period: Period) -> EngineResult<DashboardSnapshot> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%period, generation, "aggregation pass starting");

        // The three fetches are independent I/O: issue them together and
        // join. All three must succeed: costs need the catalog and ROI
        // needs the invoices, so a partial snapshot is useless.
        let (transactions, products, invoices) = tokio::join!(
            self.source.transactions(period),
            self.source.products(),
            self.source.recent_invoices(self.invoice_limit),
        );
        let (transactions, products, invoices) = match (transactions, products, invoices) {
            (Ok(transactions), Ok(products), Ok(invoices)) => (transactions, products, invoices),
            (transactions, products, invoices) => {
                // Surface the first failure; the pass aborts whole either way
                let source_err = transactions
                    .err()
                    .or(products.err())
                    .or(invoices.err())
                    .expect("at least one fetch failed in this arm");
                warn!(%period, generation, err = %source_err, "aggregation pass aborted");
                return Err(EngineError::Source(source_err));
            }
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "pass superseded during fetch, discarding");
            return Err(EngineError::Superseded { generation });
        }

        let now = Utc::now();
        let snapshot = DashboardSnapshot {
            generation,
            computed_at: now,
            dashboard: Dashboard::compute(period, now, &transactions, &products, &invoices),
        };

        // Re-check under the write lock: an even newer pass may have
        // published while we were computing.
        let mut latest = self.latest.write().await;
        if let Some(existing) = latest.as_ref() {
            if existing.generation > generation {
                debug!(generation, "pass superseded before publish, discarding");
                return Err(EngineError::Superseded { generation });
            }
        }
        *latest = Some(snapshot.clone());

        info!(
            %period,
            generation,
            transactions = snapshot.dashboard.stats.transaction_count,
            revenue = snapshot.dashboard.stats.revenue,
            "aggregation pass published"
        );
        Ok(snapshot)
    }

    /// The last successfully published snapshot, if any. After a failed
    /// pass this is what the caller keeps showing.
    pub async fn latest(&self) -> Option<DashboardSnapshot> {
        self.latest.read().await.clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::{Mutex, Notify};

    use pulse_core::types::{Invoice, InvoiceStatus, Product, Transaction};
    use pulse_source::{SourceError, SourceResult};

    /// In-memory source with a failure switch and an optional gate that
    /// parks the next transactions fetch until notified.
    struct FakeSource {
        transactions: Vec<Transaction>,
        products: Vec<Product>,
        invoices: Vec<Invoice>,
        fail_products: AtomicBool,
        gate: Mutex<Option<Arc<Notify>>>,
    }

    impl FakeSource {
        fn new() -> Self {
            let timestamp = Utc::now();
            FakeSource {
                transactions: vec![Transaction {
                    product_id: "P1".to_string(),
                    product_name: "Latte".to_string(),
                    quantity: 2,
                    unit_price: 50.0,
                    total_price: 100.0,
                    timestamp,
                }],
                products: vec![Product {
                    id: "P1".to_string(),
                    name: "Latte".to_string(),
                    category: "Coffee".to_string(),
                    cost_price: Some(30.0),
                    selling_price: Some(50.0),
                    quantity_on_hand: 10,
                }],
                invoices: vec![Invoice {
                    id: "I1".to_string(),
                    vendor_name: "Acme".to_string(),
                    total_amount: 50.0,
                    status: InvoiceStatus::Completed,
                    created_at: timestamp,
                    finalized_at: None,
                }],
                fail_products: AtomicBool::new(false),
                gate: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl DataSource for FakeSource {
        async fn transactions(&self, _period: Period) -> SourceResult<Vec<Transaction>> {
            let gate = self.gate.lock().await.take();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            Ok(self.transactions.clone())
        }

        async fn products(&self) -> SourceResult<Vec<Product>> {
            if self.fail_products.load(Ordering::SeqCst) {
                return Err(SourceError::Timeout {
                    endpoint: "/products".to_string(),
                });
            }
            Ok(self.products.clone())
        }

        async fn recent_invoices(&self, _limit: Option<u32>) -> SourceResult<Vec<Invoice>> {
            Ok(self.invoices.clone())
        }
    }

    #[tokio::test]
    async fn test_happy_path_publishes_the_reference_numbers() {
        let engine = DashboardEngine::new(Arc::new(FakeSource::new()), None);

        // `all` keeps the assertion independent of when the test runs
        let snapshot = engine.compute_dashboard(Period::All).await.unwrap();
        assert_eq!(snapshot.generation, 1);

        let stats = &snapshot.dashboard.stats;
        assert_eq!(stats.revenue, 100.0);
        assert_eq!(stats.total_cost, 60.0);
        assert_eq!(stats.gross_profit, 40.0);
        assert_eq!(stats.net_profit, 25.0);
        assert_eq!(stats.total_invoiced, 50.0);
        assert_eq!(stats.roi_percent, 100.0);

        assert_eq!(engine.latest().await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_and_keeps_last_known_good() {
        let source = Arc::new(FakeSource::new());
        let engine = DashboardEngine::new(source.clone(), None);

        let good = engine.compute_dashboard(Period::Today).await.unwrap();

        source.fail_products.store(true, Ordering::SeqCst);
        let err = engine.compute_dashboard(Period::Today).await.unwrap_err();
        assert!(matches!(err, EngineError::Source(_)));
        assert!(err.is_retryable());

        // The failed pass changed nothing
        assert_eq!(engine.latest().await.unwrap(), good);
    }

    #[tokio::test]
    async fn test_slow_stale_pass_cannot_overwrite_a_newer_one() {
        let source = Arc::new(FakeSource::new());
        let gate = Arc::new(Notify::new());
        *source.gate.lock().await = Some(gate.clone());

        let engine = Arc::new(DashboardEngine::new(source, None));

        // Pass 1 claims its generation, then parks on the gated fetch
        let slow = tokio::spawn({
            let engine = engine.clone();
            async move { engine.compute_dashboard(Period::Today).await }
        });
        tokio::task::yield_now().await;

        // Pass 2 (requested later, e.g. the user changed period) lands first
        let fresh = engine.compute_dashboard(Period::Week).await.unwrap();
        assert_eq!(fresh.generation, 2);
        assert_eq!(fresh.dashboard.period, Period::Week);

        // Release the stale pass: it must discard itself
        gate.notify_one();
        let stale = slow.await.unwrap();
        assert!(matches!(stale, Err(EngineError::Superseded { generation: 1 })));

        // The published state still belongs to the newer pass
        let latest = engine.latest().await.unwrap();
        assert_eq!(latest.generation, 2);
        assert_eq!(latest.dashboard.period, Period::Week);
    }

    #[tokio::test]
    async fn test_repeat_passes_agree_on_identical_data() {
        let engine = DashboardEngine::new(Arc::new(FakeSource::new()), None);

        let first = engine.compute_dashboard(Period::All).await.unwrap();
        let second = engine.compute_dashboard(Period::All).await.unwrap();

        // Generations differ, the dashboards do not
        assert_ne!(first.generation, second.generation);
        assert_eq!(first.dashboard.stats, second.dashboard.stats);
        assert_eq!(first.dashboard.rankings, second.dashboard.rankings);
        assert_eq!(first.dashboard.invoices, second.dashboard.invoices);
    }
}
