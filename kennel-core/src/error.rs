//! Error types for kennel operations

use crate::Collection;
use thiserror::Error;

/// Remote store and cache errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The backend answered with an error. The message is passed through
    /// verbatim so the operator sees what the store said.
    #[error("Backend error on {collection}{}: {message}", http_status(.status))]
    Backend {
        collection: Collection,
        status: Option<u16>,
        message: String,
    },

    #[error("Transport error on {collection}: {reason}")]
    Transport { collection: Collection, reason: String },

    #[error("Entity not found: {collection} with id {id}")]
    NotFound { collection: Collection, id: String },

    #[error("Failed to decode {collection}.{column}: {reason}")]
    Decode {
        collection: Collection,
        column: String,
        reason: String,
    },

    #[error("Failed to encode field {field}: {reason}")]
    Encode { field: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

fn http_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Validation errors raised at the repository boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} references missing {collection} id {id}")]
    DanglingReference {
        field: String,
        collection: Collection,
        id: String,
    },

    /// A reference that must be unique already belongs to another entity.
    #[error("{field} {id} is already claimed by {collection} id {holder}")]
    AlreadyClaimed {
        field: String,
        collection: Collection,
        id: String,
        holder: String,
    },

    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Failures of a multi-write sequence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsistencyError {
    /// A follow-up write failed. When `compensated` is true the first write
    /// was undone and the store is back where it started.
    #[error("Side effect '{step}' failed (compensated: {compensated}): {reason}")]
    SideEffectFailed {
        step: String,
        reason: String,
        compensated: bool,
    },

    /// A follow-up write failed and undoing the first write failed too. The
    /// collections now disagree and need operator attention.
    #[error("Compensation for '{step}' failed, collections diverged: {reason}")]
    CompensationFailed { step: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Failed to parse config TOML: {0}")]
    Parse(String),
}

/// Master error type for all kennel errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KennelError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Consistency error: {0}")]
    Consistency(#[from] ConsistencyError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl KennelError {
    /// True when the failure came from the remote store itself.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            KennelError::Storage(StorageError::Backend { .. })
                | KennelError::Storage(StorageError::Transport { .. })
        )
    }
}

/// Result type alias for kennel operations.
pub type KennelResult<T> = Result<T, KennelError>;

// =============================================================================
// TESTS
// =============================================================================
