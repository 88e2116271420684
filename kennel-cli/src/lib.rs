//! KENNEL Operator CLI
//!
//! Resolves configuration, installs logging, bulk-loads the cache and renders
//! the daily alert digest.

pub mod config;
pub mod digest;
pub mod error;
pub mod telemetry;

pub use config::{config_path, load_config};
pub use digest::Digest;
pub use error::{CliError, CliResult};
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig};
