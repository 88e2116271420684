//! Configuration source resolution.
//!
//! `--config <path>` wins, then `KENNEL_CONFIG`, then plain `KENNEL_*`
//! environment variables.

use kennel_core::{ConfigError, KennelConfig};
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "KENNEL_CONFIG";

/// Config file path from the arguments (without the program name) or the
/// environment lookup.
pub fn config_path<I, F>(args: I, lookup: F) -> Result<Option<PathBuf>, ConfigError>
where
    I: IntoIterator<Item = String>,
    F: Fn(&str) -> Option<String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return match args.next() {
                Some(path) => Ok(Some(PathBuf::from(path))),
                None => Err(ConfigError::MissingRequired {
                    field: "--config <path>".to_string(),
                }),
            };
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Ok(Some(PathBuf::from(path)));
        }
    }
    Ok(lookup(CONFIG_PATH_ENV)
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from))
}

/// Load the configuration for this process.
pub fn load_config() -> Result<KennelConfig, ConfigError> {
    let lookup = |key: &str| std::env::var(key).ok();
    match config_path(std::env::args().skip(1), lookup)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading config file");
            KennelConfig::from_path(&path)
        }
        None => KennelConfig::from_env(),
    }
}
