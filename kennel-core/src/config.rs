//! Configuration loading.
//!
//! Configuration comes from a TOML file or from `KENNEL_*` environment
//! variables. Alert windows have defaults; the store must be chosen.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default request timeout for the hosted backend.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default schema header sent to the hosted backend.
pub const DEFAULT_REST_SCHEMA: &str = "public";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KennelConfig {
    pub store: StoreConfig,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub alerts: AlertConfig,
}

/// Which remote store backend to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// On-device key space, contents live for the process.
    Memory,
    /// Hosted PostgREST-style backend.
    Rest {
        base_url: String,
        api_key: String,
        #[serde(default)]
        schema: Option<String>,
    },
}

/// Look-ahead windows for the alert digest, in days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertConfig {
    pub rabies_window_days: i64,
    pub vaccination_window_days: i64,
    pub birthday_window_days: i64,
    pub reminder_window_days: i64,
    pub default_heat_cycle_days: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            rabies_window_days: 60,
            vaccination_window_days: 60,
            birthday_window_days: 30,
            reminder_window_days: 7,
            default_heat_cycle_days: 180,
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl Default for KennelConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::Memory,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            alerts: AlertConfig::default(),
        }
    }
}

impl KennelConfig {
    /// Read and validate a TOML config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: KennelConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Create config from environment variables.
    ///
    /// Environment variables:
    /// - `KENNEL_STORE`: "memory" or "rest" (required)
    /// - `KENNEL_REST_URL`, `KENNEL_REST_API_KEY`: required for "rest"
    /// - `KENNEL_REST_SCHEMA`: optional schema name
    /// - `KENNEL_REQUEST_TIMEOUT_MS`: default 10000
    /// - `KENNEL_RABIES_WINDOW_DAYS`: default 60
    /// - `KENNEL_VACCINATION_WINDOW_DAYS`: default 60
    /// - `KENNEL_BIRTHDAY_WINDOW_DAYS`: default 30
    /// - `KENNEL_REMINDER_WINDOW_DAYS`: default 7
    /// - `KENNEL_DEFAULT_HEAT_CYCLE_DAYS`: default 180
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("KENNEL_STORE").as_deref().map(str::trim) {
            None | Some("") => {
                return Err(ConfigError::MissingRequired {
                    field: "KENNEL_STORE".to_string(),
                })
            }
            Some(kind) if kind.eq_ignore_ascii_case("memory") => StoreConfig::Memory,
            Some(kind) if kind.eq_ignore_ascii_case("rest") => StoreConfig::Rest {
                base_url: required(&lookup, "KENNEL_REST_URL")?,
                api_key: required(&lookup, "KENNEL_REST_API_KEY")?,
                schema: lookup("KENNEL_REST_SCHEMA").filter(|s| !s.trim().is_empty()),
            },
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    field: "KENNEL_STORE".to_string(),
                    reason: format!("unknown store '{other}', expected memory or rest"),
                })
            }
        };

        let defaults = AlertConfig::default();
        let config = Self {
            store,
            request_timeout_ms: parsed(
                &lookup,
                "KENNEL_REQUEST_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
            )?,
            alerts: AlertConfig {
                rabies_window_days: parsed(
                    &lookup,
                    "KENNEL_RABIES_WINDOW_DAYS",
                    defaults.rabies_window_days,
                )?,
                vaccination_window_days: parsed(
                    &lookup,
                    "KENNEL_VACCINATION_WINDOW_DAYS",
                    defaults.vaccination_window_days,
                )?,
                birthday_window_days: parsed(
                    &lookup,
                    "KENNEL_BIRTHDAY_WINDOW_DAYS",
                    defaults.birthday_window_days,
                )?,
                reminder_window_days: parsed(
                    &lookup,
                    "KENNEL_REMINDER_WINDOW_DAYS",
                    defaults.reminder_window_days,
                )?,
                default_heat_cycle_days: parsed(
                    &lookup,
                    "KENNEL_DEFAULT_HEAT_CYCLE_DAYS",
                    defaults.default_heat_cycle_days,
                )?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let StoreConfig::Rest {
            base_url,
            api_key,
            schema,
        } = &self.store
        {
            if base_url.trim().is_empty() {
                return Err(invalid("store.base_url", "must not be empty"));
            }
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(invalid("store.base_url", "must start with http:// or https://"));
            }
            if api_key.trim().is_empty() {
                return Err(invalid("store.api_key", "must not be empty"));
            }
            if schema.as_deref().is_some_and(|s| s.trim().is_empty()) {
                return Err(invalid("store.schema", "must not be empty when set"));
            }
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be > 0"));
        }

        let windows = [
            ("alerts.rabies_window_days", self.alerts.rabies_window_days),
            (
                "alerts.vaccination_window_days",
                self.alerts.vaccination_window_days,
            ),
            ("alerts.birthday_window_days", self.alerts.birthday_window_days),
            ("alerts.reminder_window_days", self.alerts.reminder_window_days),
        ];
        for (field, days) in windows {
            if days <= 0 {
                return Err(invalid(field, "must be > 0"));
            }
        }
        if self.alerts.default_heat_cycle_days == 0 {
            return Err(invalid("alerts.default_heat_cycle_days", "must be > 0"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingRequired {
            field: key.to_string(),
        })
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: key.to_string(),
            reason: e.to_string(),
        }),
    }
}
