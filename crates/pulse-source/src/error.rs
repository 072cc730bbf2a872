//! # Fetch Error Types
//!
//! The error taxonomy of the data-source boundary.
//!
//! ## Why Four Kinds?
//! The caller reacts differently to each:
//! - a timeout or transport failure is retry-worthy;
//! - a 4xx means the request itself is wrong; retrying is pointless;
//! - a decode failure means the upstream contract drifted and a human
//!   should look at it.
//!
//! Whatever the kind, a fetch error aborts the WHOLE aggregation pass;
//! the engine never mixes a fresh transaction set with stale products.

use thiserror::Error;

// =============================================================================
// Source Error
// =============================================================================

/// A failure while fetching or decoding records from the data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The bounded per-request timeout elapsed before a response arrived.
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// The server responded with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The request never completed: connection refused, DNS failure,
    /// TLS error, or a dropped connection.
    #[error("failed to reach {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The response body did not parse as the expected envelope.
    #[error("could not decode the response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl SourceError {
    /// True when the failure was the bounded timeout (as opposed to a
    /// reachability or protocol problem).
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Timeout { .. })
    }

    /// True when retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Timeout { .. } | SourceError::Transport { .. } => true,
            SourceError::Status { status, .. } => *status >= 500,
            SourceError::Decode { .. } => false,
        }
    }

    /// Maps a reqwest failure onto the taxonomy.
    pub(crate) fn from_reqwest(endpoint: &str, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if let Some(status) = err.status() {
            SourceError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            SourceError::Decode {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        } else {
            SourceError::Transport {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Convenience type alias for Results with SourceError.
pub type SourceResult<T> = Result<T, SourceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        let timeout = SourceError::Timeout {
            endpoint: "/products".to_string(),
        };
        assert!(timeout.is_timeout());
        assert!(timeout.is_retryable());

        let transport = SourceError::Transport {
            endpoint: "/products".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(!transport.is_timeout());
        assert!(transport.is_retryable());

        let server_error = SourceError::Status {
            endpoint: "/products".to_string(),
            status: 503,
        };
        assert!(server_error.is_retryable());

        let client_error = SourceError::Status {
            endpoint: "/products".to_string(),
            status: 404,
        };
        assert!(!client_error.is_retryable());

        let decode = SourceError::Decode {
            endpoint: "/products".to_string(),
            message: "expected an object".to_string(),
        };
        assert!(!decode.is_retryable());
    }

    #[test]
    fn test_error_messages_carry_the_endpoint() {
        let err = SourceError::Status {
            endpoint: "/invoices/recent".to_string(),
            status: 502,
        };
        assert_eq!(err.to_string(), "/invoices/recent returned HTTP 502");
    }
}
