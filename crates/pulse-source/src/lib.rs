//! # pulse-source: Data-Source Boundary for Pulse Analytics
//!
//! Fetches transaction, product, and invoice records from the external
//! REST data source and normalizes them into the canonical
//! [`pulse_core`] schema before anything downstream sees them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      pulse-source (THIS CRATE)                          │
//! │                                                                         │
//! │  ┌─────────────┐   ┌──────────────┐   ┌──────────────────────────┐     │
//! │  │ RestSource  │   │   wire DTOs  │   │      SourceError         │     │
//! │  │ (client.rs) │   │  (wire.rs)   │   │      (error.rs)          │     │
//! │  │             │   │              │   │                          │     │
//! │  │ GET with    │──►│ alias + type │   │ Timeout / Status /       │     │
//! │  │ bounded     │   │ coercion ──► │   │ Transport / Decode       │     │
//! │  │ timeout     │   │ canonical    │   │ (+ is_retryable)         │     │
//! │  └─────────────┘   └──────────────┘   └──────────────────────────┘     │
//! │                                                                         │
//! │  The `DataSource` trait below is the seam the engine consumes -        │
//! │  production wires in `RestSource`, tests wire in fakes.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod error;
pub mod wire;

pub use client::RestSource;
pub use error::{SourceError, SourceResult};

use async_trait::async_trait;

use pulse_core::types::{Invoice, Product, Transaction};
use pulse_core::Period;

// =============================================================================
// Data Source Trait
// =============================================================================

/// The record-fetching seam between the engine and the outside world.
///
/// All three fetches are independent I/O operations; the engine issues
/// them concurrently and joins before aggregating. Implementations must
/// bound each call with a timeout so a hung upstream cannot stall a pass
/// forever.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Sale transactions for the given period.
    async fn transactions(&self, period: Period) -> SourceResult<Vec<Transaction>>;

    /// The full product catalog.
    async fn products(&self) -> SourceResult<Vec<Product>>;

    /// Recent supplier invoices, newest first, optionally limited.
    async fn recent_invoices(&self, limit: Option<u32>) -> SourceResult<Vec<Invoice>>;
}
