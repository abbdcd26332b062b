//! Typed error enum for the service layer.
//!
//! Unifies export, storage and filesystem failures into a single error type,
//! so callers match on the failure mode instead of downcasting.

use ia_core::ExportError;
use ia_storage::StorageError;
use thiserror::Error;

/// Service-layer error unifying export, storage and I/O failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The export could not be read or is malformed.
    #[error("export: {0}")]
    Export(#[from] ExportError),

    /// Storage operation failed with a non-retryable error.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// A transient storage error persisted through every retry.
    #[error("{operation} still failing after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: StorageError,
    },

    /// Reading or writing an analysis or report file failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization of analysis output failed.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            _ => false,
        }
    }
}
