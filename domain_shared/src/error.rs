//! Errors raised by configuration persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Fatal configuration errors.
///
/// Unknown keys passed to an update are not errors; they are reported through
/// [`crate::UpdateReport`] and a `tracing` warning instead.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("configuration is for domain {found:?}, expected {expected:?}")]
    DomainMismatch { expected: String, found: String },

    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    #[error("{} has no `game` key", path.display())]
    MissingDomain { path: PathBuf },

    #[error("field {field} expects {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },
}

impl DomainError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DomainError::Io {
            path: path.into(),
            source,
        }
    }
}
