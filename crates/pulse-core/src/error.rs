//! # Error Types
//!
//! Domain error types for pulse-core.
//!
//! The core is pure, so very little can go wrong here: the aggregation
//! functions are total over their canonical inputs. What remains is input
//! interpretation at the edges (parsing a period selector from the UI or
//! a query string). Fetch and orchestration failures live in the
//! `pulse-source` and `pulse-engine` crates respectively.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core analytics errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A period selector string didn't match any known period.
    ///
    /// ## When This Occurs
    /// - A query string carries a typo (`?period=weeek`)
    /// - The frontend and engine disagree on selector spelling
    #[error("Unknown period: '{0}'. Valid options: today, week, month, year, all")]
    InvalidPeriod(String),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
