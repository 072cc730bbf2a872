//! # Wire Shapes & Normalization
//!
//! The upstream API grew organically: records arrive as loosely-typed
//! JSON with inconsistent field-name spellings (`totalPrice` vs
//! `total_price`), numerics that are sometimes strings, and the
//! occasional missing field. This module is the single boundary where all
//! of that is resolved.
//!
//! ## Normalization Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ingestion Boundary                                   │
//! │                                                                         │
//! │  Field names   snake_case and camelCase aliases both accepted          │
//! │                                                                         │
//! │  Required numerics (prices, amounts, quantities)                       │
//! │    number      kept                                                     │
//! │    "12.50"     parsed                                                   │
//! │    null/missing/garbage/non-finite ─► 0   (one bad record must not     │
//! │                                            abort the pass)             │
//! │                                                                         │
//! │  Optional numerics (catalog cost/selling price)                        │
//! │    garbage ─► None, NEVER Some(0) - a fabricated zero cost would be    │
//! │    reported as an "actual" cost downstream                             │
//! │                                                                         │
//! │  Timestamps    RFC 3339 string or epoch milliseconds; unparseable      │
//! │                falls to the epoch sentinel, outside every bounded      │
//! │                window                                                   │
//! │                                                                         │
//! │  Invoice status  pending/processing/completed|success/failed|error;    │
//! │                  anything else is logged and treated as pending        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything past this module is strictly typed against
//! [`pulse_core::types`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use pulse_core::types::{Invoice, InvoiceStatus, Product, Transaction};

// =============================================================================
// Lenient Scalar Deserializers
// =============================================================================

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Required currency/amount field: malformed values coerce to 0.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64).unwrap_or(0.0))
}

/// Optional currency field: malformed values become `None`, not `Some(0)`.
fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64))
}

/// Required count field: malformed values coerce to 0, fractions truncate.
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    };
    Ok(parsed.unwrap_or(0))
}

/// Timestamp field: RFC 3339 string or epoch milliseconds.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };
    Ok(parsed)
}

/// Records without a usable timestamp get the epoch sentinel: they fall
/// outside every bounded window and every bucket axis, but still count
/// under the unbounded `all` period.
fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

// =============================================================================
// Raw Transaction
// =============================================================================

/// A sale record as the wire delivers it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    #[serde(alias = "productId", default)]
    pub product_id: Option<String>,

    #[serde(alias = "productName", default)]
    pub product_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: i64,

    #[serde(alias = "unitPrice", default, deserialize_with = "lenient_f64")]
    pub unit_price: f64,

    #[serde(alias = "totalPrice", default, deserialize_with = "lenient_f64")]
    pub total_price: f64,

    #[serde(
        alias = "createdAt",
        alias = "created_at",
        default,
        deserialize_with = "lenient_datetime"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawTransaction {
    /// Normalizes into the canonical schema.
    pub fn into_domain(self) -> Transaction {
        Transaction {
            product_id: self.product_id.unwrap_or_default(),
            product_name: self.product_name.unwrap_or_default(),
            quantity: self.quantity.max(0),
            unit_price: self.unit_price,
            total_price: self.total_price,
            timestamp: self.timestamp.unwrap_or_else(epoch),
        }
    }
}

// =============================================================================
// Raw Product
// =============================================================================

/// A catalog record as the wire delivers it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(alias = "costPrice", default, deserialize_with = "lenient_opt_f64")]
    pub cost_price: Option<f64>,

    #[serde(alias = "sellingPrice", default, deserialize_with = "lenient_opt_f64")]
    pub selling_price: Option<f64>,

    #[serde(
        alias = "quantityOnHand",
        alias = "stock",
        default,
        deserialize_with = "lenient_i64"
    )]
    pub quantity_on_hand: i64,
}

impl RawProduct {
    /// Normalizes into the canonical schema.
    pub fn into_domain(self) -> Product {
        Product {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            cost_price: self.cost_price,
            selling_price: self.selling_price,
            quantity_on_hand: self.quantity_on_hand,
        }
    }
}

// =============================================================================
// Raw Invoice
// =============================================================================

/// A supplier invoice as the wire delivers it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInvoice {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(alias = "vendorName", alias = "vendor", default)]
    pub vendor_name: Option<String>,

    #[serde(alias = "totalAmount", alias = "amount", default, deserialize_with = "lenient_f64")]
    pub total_amount: f64,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(alias = "createdAt", default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(
        alias = "finalizedAt",
        alias = "completedAt",
        default,
        deserialize_with = "lenient_datetime"
    )]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl RawInvoice {
    /// Normalizes into the canonical schema.
    pub fn into_domain(self) -> Invoice {
        Invoice {
            status: parse_status(self.status.as_deref(), self.id.as_deref()),
            id: self.id.unwrap_or_default(),
            vendor_name: self.vendor_name.unwrap_or_default(),
            total_amount: self.total_amount,
            created_at: self.created_at.unwrap_or_else(epoch),
            finalized_at: self.finalized_at,
        }
    }
}

/// Maps the wire's status strings (and their synonyms) onto the canonical
/// enum. Unrecognized values are logged and treated as pending.
fn parse_status(raw: Option<&str>, invoice_id: Option<&str>) -> InvoiceStatus {
    match raw.map(|s| s.trim().to_lowercase()) {
        None => InvoiceStatus::Pending,
        Some(status) => match status.as_str() {
            "pending" => InvoiceStatus::Pending,
            "processing" => InvoiceStatus::Processing,
            "completed" | "success" => InvoiceStatus::Completed,
            "failed" | "error" => InvoiceStatus::Failed,
            other => {
                debug!(
                    status = other,
                    invoice_id = invoice_id.unwrap_or("?"),
                    "unrecognized invoice status, treating as pending"
                );
                InvoiceStatus::Pending
            }
        },
    }
}

// =============================================================================
// Response Envelopes
// =============================================================================

/// `GET /transactions` response body.
#[derive(Debug, Deserialize)]
pub struct TransactionsEnvelope {
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

impl TransactionsEnvelope {
    pub fn into_domain(self) -> Vec<Transaction> {
        self.transactions
            .into_iter()
            .map(RawTransaction::into_domain)
            .collect()
    }
}

/// `GET /products` response body.
#[derive(Debug, Deserialize)]
pub struct ProductsEnvelope {
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

impl ProductsEnvelope {
    pub fn into_domain(self) -> Vec<Product> {
        self.products.into_iter().map(RawProduct::into_domain).collect()
    }
}

/// `GET /invoices/recent` response body.
#[derive(Debug, Deserialize)]
pub struct InvoicesEnvelope {
    #[serde(default)]
    pub invoices: Vec<RawInvoice>,
}

impl InvoicesEnvelope {
    pub fn into_domain(self) -> Vec<Invoice> {
        self.invoices.into_iter().map(RawInvoice::into_domain).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_camel_and_snake_case_both_accepted() {
        let camel: RawTransaction = serde_json::from_str(
            r#"{"productId":"P1","productName":"Latte","quantity":2,
                "unitPrice":4.5,"totalPrice":9.0,"timestamp":"2026-08-07T10:00:00Z"}"#,
        )
        .unwrap();
        let snake: RawTransaction = serde_json::from_str(
            r#"{"product_id":"P1","product_name":"Latte","quantity":2,
                "unit_price":4.5,"total_price":9.0,"timestamp":"2026-08-07T10:00:00Z"}"#,
        )
        .unwrap();

        let camel = camel.into_domain();
        let snake = snake.into_domain();
        assert_eq!(camel, snake);
        assert_eq!(camel.total_price, 9.0);
        assert_eq!(
            camel.timestamp,
            Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_malformed_numerics_coerce_to_zero() {
        let raw: RawTransaction = serde_json::from_str(
            r#"{"productId":"P1","quantity":null,"totalPrice":"oops","unitPrice":"4.50"}"#,
        )
        .unwrap();
        let tx = raw.into_domain();
        assert_eq!(tx.quantity, 0);
        assert_eq!(tx.total_price, 0.0);
        assert_eq!(tx.unit_price, 4.5);
    }

    #[test]
    fn test_string_and_fractional_quantities() {
        let raw: RawTransaction =
            serde_json::from_str(r#"{"quantity":"3","totalPrice":30}"#).unwrap();
        assert_eq!(raw.into_domain().quantity, 3);

        let raw: RawTransaction =
            serde_json::from_str(r#"{"quantity":2.9,"totalPrice":30}"#).unwrap();
        assert_eq!(raw.into_domain().quantity, 2);
    }

    #[test]
    fn test_missing_timestamp_falls_to_epoch_sentinel() {
        let raw: RawTransaction = serde_json::from_str(r#"{"totalPrice":10}"#).unwrap();
        assert_eq!(raw.into_domain().timestamp, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_epoch_millis_timestamps() {
        let raw: RawTransaction =
            serde_json::from_str(r#"{"totalPrice":10,"timestamp":1754557200000}"#).unwrap();
        assert_eq!(
            raw.into_domain().timestamp,
            Utc.with_ymd_and_hms(2025, 8, 7, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_catalog_garbage_prices_stay_none() {
        // A fabricated Some(0.0) would flow into "actual cost" downstream
        let raw: RawProduct = serde_json::from_str(
            r#"{"id":"P1","name":"Latte","costPrice":"n/a","sellingPrice":null}"#,
        )
        .unwrap();
        let product = raw.into_domain();
        assert_eq!(product.cost_price, None);
        assert_eq!(product.selling_price, None);

        let raw: RawProduct =
            serde_json::from_str(r#"{"id":"P1","costPrice":"7.25","stock":12}"#).unwrap();
        let product = raw.into_domain();
        assert_eq!(product.cost_price, Some(7.25));
        assert_eq!(product.quantity_on_hand, 12);
    }

    #[test]
    fn test_invoice_status_synonyms() {
        for (wire, expected) in [
            ("pending", InvoiceStatus::Pending),
            ("processing", InvoiceStatus::Processing),
            ("completed", InvoiceStatus::Completed),
            ("success", InvoiceStatus::Completed),
            ("SUCCESS", InvoiceStatus::Completed),
            ("failed", InvoiceStatus::Failed),
            ("error", InvoiceStatus::Failed),
            ("banana", InvoiceStatus::Pending),
        ] {
            let json = format!(r#"{{"id":"I1","totalAmount":10,"status":"{wire}"}}"#);
            let raw: RawInvoice = serde_json::from_str(&json).unwrap();
            assert_eq!(raw.into_domain().status, expected, "wire status {wire}");
        }
    }

    #[test]
    fn test_invoice_aliases() {
        let raw: RawInvoice = serde_json::from_str(
            r#"{"id":"I1","vendor":"Acme","amount":"99.90","status":"completed",
                "createdAt":"2026-08-07T08:00:00+02:00"}"#,
        )
        .unwrap();
        let invoice = raw.into_domain();
        assert_eq!(invoice.vendor_name, "Acme");
        assert_eq!(invoice.total_amount, 99.9);
        // Offset timestamps normalize to UTC
        assert_eq!(
            invoice.created_at,
            Utc.with_ymd_and_hms(2026, 8, 7, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_empty_envelope_bodies() {
        let envelope: TransactionsEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.into_domain().is_empty());

        let envelope: InvoicesEnvelope = serde_json::from_str(r#"{"invoices":[]}"#).unwrap();
        assert!(envelope.into_domain().is_empty());
    }
}
