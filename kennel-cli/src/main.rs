//! KENNEL CLI Entry Point
//!
//! Loads configuration, builds the configured store, bulk-loads the cache
//! and prints today's digest.

use chrono::Utc;
use kennel_cli::{init_tracing, load_config, CliResult, Digest, TelemetryConfig};
use kennel_storage::Kennel;

#[tokio::main]
async fn main() -> CliResult<()> {
    init_tracing(&TelemetryConfig::from_env())?;

    let config = load_config()?;
    let kennel = Kennel::from_config(&config)?;

    let report = kennel.load().await;
    for (collection, err) in &report.failed {
        tracing::warn!(%collection, error = %err, "Collection unavailable for this digest");
    }
    tracing::info!(
        backend = kennel.store().backend(),
        entities = report.total_loaded(),
        "Kennel loaded"
    );

    let digest = Digest::collect(&kennel, Utc::now());
    print!("{digest}");

    kennel.shutdown();
    Ok(())
}
