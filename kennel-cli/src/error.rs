//! CLI error type.

use kennel_core::{ConfigError, KennelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Kennel(#[from] KennelError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to init logging: {0}")]
    Telemetry(String),
}

pub type CliResult<T> = Result<T, CliError>;
