//! Computes one dashboard against a running data source and prints it.
//!
//! ```text
//! PULSE_BASE_URL=http://127.0.0.1:4100 cargo run --example dashboard -- week
//! ```

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use pulse_core::Period;
use pulse_engine::{DashboardEngine, EngineConfig};
use pulse_source::RestSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let period: Period = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "today".to_string())
        .parse()?;

    let config = EngineConfig::from_env();
    config.validate()?;
    info!(base_url = %config.base_url, %period, "computing dashboard");

    let source = Arc::new(RestSource::new(&config.base_url, config.fetch_timeout())?);
    let engine = DashboardEngine::new(source, config.invoice_fetch_limit);

    let snapshot = engine.compute_dashboard(period).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
