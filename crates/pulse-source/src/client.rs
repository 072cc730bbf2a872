//! # REST Client
//!
//! The production [`DataSource`] implementation over the external REST
//! API.
//!
//! ## Endpoints
//! ```text
//! GET {base}/transactions?type=sale&period={today|week|month|year|all}
//! GET {base}/products
//! GET {base}/invoices/recent[?limit=N]
//! ```
//!
//! Every request carries the bounded timeout configured at construction.
//! A timeout surfaces as [`SourceError::Timeout`], distinct from
//! reachability failures, so the caller can tell retry-worthy conditions
//! apart.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use pulse_core::types::{Invoice, Product, Transaction};
use pulse_core::Period;

use crate::error::{SourceError, SourceResult};
use crate::wire::{InvoicesEnvelope, ProductsEnvelope, TransactionsEnvelope};
use crate::DataSource;

// =============================================================================
// Rest Source
// =============================================================================

/// Fetches records from the REST data source.
pub struct RestSource {
    /// Shared connection pool; reqwest clients are cheap to clone and
    /// hold their pool internally.
    http: reqwest::Client,

    /// Base URL without a trailing slash.
    base_url: String,
}

impl RestSource {
    /// Creates a client for the given base URL with a bounded
    /// per-request timeout.
    pub fn new(base_url: impl Into<String>, fetch_timeout: Duration) -> SourceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(|err| SourceError::Transport {
                endpoint: "client setup".to_string(),
                message: err.to_string(),
            })?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(RestSource { http, base_url })
    }

    /// GETs `path` and decodes the JSON body as `T`.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> SourceResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "fetching");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| SourceError::from_reqwest(path, err))?
            .error_for_status()
            .map_err(|err| SourceError::from_reqwest(path, err))?;

        response
            .json::<T>()
            .await
            .map_err(|err| SourceError::from_reqwest(path, err))
    }
}

#[async_trait]
impl DataSource for RestSource {
    async fn transactions(&self, period: Period) -> SourceResult<Vec<Transaction>> {
        let path = format!("/transactions?type=sale&period={period}");
        let envelope: TransactionsEnvelope = self.get_json(&path).await?;
        let transactions = envelope.into_domain();
        debug!(count = transactions.len(), %period, "fetched transactions");
        Ok(transactions)
    }

    async fn products(&self) -> SourceResult<Vec<Product>> {
        let envelope: ProductsEnvelope = self.get_json("/products").await?;
        let products = envelope.into_domain();
        debug!(count = products.len(), "fetched products");
        Ok(products)
    }

    async fn recent_invoices(&self, limit: Option<u32>) -> SourceResult<Vec<Invoice>> {
        let path = match limit {
            Some(limit) => format!("/invoices/recent?limit={limit}"),
            None => "/invoices/recent".to_string(),
        };
        let envelope: InvoicesEnvelope = self.get_json(&path).await?;
        let invoices = envelope.into_domain();
        debug!(count = invoices.len(), "fetched invoices");
        Ok(invoices)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
