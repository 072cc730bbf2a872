//! # Engine Error Types
//!
//! Failures of an aggregation pass or of the machinery around it.
//!
//! ## Propagation Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SourceError (any of the three fetches)                                │
//! │      │  aborts the WHOLE pass - no partial mixing of fresh and         │
//! │      ▼  stale data. The engine keeps its last-known-good snapshot.     │
//! │  EngineError::Source ──► caller shows the error + a retry action       │
//! │                                                                         │
//! │  Superseded: a newer pass finished first. Not a failure - the          │
//! │  scheduler logs it at debug and moves on.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use pulse_source::SourceError;

// =============================================================================
// Engine Error
// =============================================================================

/// An aggregation pass or scheduler failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// One of the three record fetches failed; the pass was aborted
    /// before any state changed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The pass lost the race: a later-requested pass already published.
    /// Its result was discarded, never written.
    #[error("aggregation pass {generation} was superseded by a newer request")]
    Superseded { generation: u64 },

    /// The engine configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scheduler control channel closed (the scheduler is gone).
    #[error("scheduler channel closed: {0}")]
    Channel(String),
}

impl EngineError {
    /// True when retrying the pass may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Source(source) => source.is_retryable(),
            EngineError::Superseded { .. } => false,
            EngineError::InvalidConfig(_) => false,
            EngineError::Channel(_) => false,
        }
    }
}

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_retryability_passes_through() {
        let err: EngineError = SourceError::Timeout {
            endpoint: "/transactions".to_string(),
        }
        .into();
        assert!(err.is_retryable());

        let err: EngineError = SourceError::Status {
            endpoint: "/transactions".to_string(),
            status: 400,
        }
        .into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_superseded_is_not_retryable() {
        let err = EngineError::Superseded { generation: 3 };
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "aggregation pass 3 was superseded by a newer request"
        );
    }
}
