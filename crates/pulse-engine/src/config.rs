//! # Engine Configuration
//!
//! Runtime configuration for the dashboard engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PULSE_BASE_URL=http://127.0.0.1:4100                               │
//! │     PULSE_FETCH_TIMEOUT_SECS=10                                        │
//! │     PULSE_REFRESH_INTERVAL_SECS=60                                     │
//! │     PULSE_INVOICE_LIMIT=200                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     base_url = "http://127.0.0.1:4100"                                 │
//! │     fetch_timeout_secs = 10                                            │
//! │     refresh_interval_secs = 60                                         │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Defaults
// =============================================================================

fn default_base_url() -> String {
    "http://127.0.0.1:4100".to_string()
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_refresh_interval() -> u64 {
    60
}

// =============================================================================
// Engine Config
// =============================================================================

/// Configuration for the engine and its refresh scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the external data source.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bound on each of the three record fetches (seconds). A fetch that
    /// exceeds this surfaces as a timeout, distinct from a network error.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Interval between scheduled recomputes (seconds).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Optional `limit` passed to the recent-invoices endpoint.
    /// `None` lets the upstream default apply.
    #[serde(default)]
    pub invoice_fetch_limit: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            base_url: default_base_url(),
            fetch_timeout_secs: default_fetch_timeout(),
            refresh_interval_secs: default_refresh_interval(),
            invoice_fetch_limit: None,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> EngineResult<Self> {
        toml::from_str(contents).map_err(|err| EngineError::InvalidConfig(err.to_string()))
    }

    /// Defaults overlaid with any `PULSE_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = EngineConfig::default();
        config.apply_env();
        config
    }

    /// Overlays `PULSE_*` environment variables onto this config.
    /// Unparseable values are logged and ignored.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("PULSE_BASE_URL") {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        if let Some(secs) = env_u64("PULSE_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = secs;
        }
        if let Some(secs) = env_u64("PULSE_REFRESH_INTERVAL_SECS") {
            self.refresh_interval_secs = secs;
        }
        if let Some(limit) = env_u64("PULSE_INVOICE_LIMIT") {
            self.invoice_fetch_limit = Some(limit as u32);
        }
    }

    /// Checks the configuration makes sense before anything starts.
    pub fn validate(&self) -> EngineResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(EngineError::InvalidConfig("base_url is required".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(EngineError::InvalidConfig(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(EngineError::InvalidConfig(
                "fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.refresh_interval_secs == 0 {
            return Err(EngineError::InvalidConfig(
                "refresh_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The fetch bound as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// The refresh cadence as a [`Duration`].
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.refresh_interval_secs, 60);
        assert_eq!(config.invoice_fetch_limit, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_with_partial_keys() {
        let config = EngineConfig::from_toml_str(
            r#"
            base_url = "https://pos.example.net"
            refresh_interval_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://pos.example.net");
        assert_eq!(config.refresh_interval_secs, 30);
        // Untouched keys keep their defaults
        assert_eq!(config.fetch_timeout_secs, 10);
    }

    #[test]
    fn test_validation_rejects_nonsense() {
        let mut config = EngineConfig::default();
        config.base_url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.fetch_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.refresh_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_durations() {
        let config = EngineConfig::default();
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
    }
}
