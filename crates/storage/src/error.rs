//! Typed error enum for the storage layer.
//!
//! Callers match on the failure class (transient lock contention versus fatal
//! constraint or disk failure) instead of inspecting raw SQLite codes.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Another connection holds a conflicting lock (`SQLITE_BUSY` / `SQLITE_LOCKED`).
    #[error("database busy: {0}")]
    Busy(#[source] rusqlite::Error),

    /// No pooled connection became available in time.
    #[error("connection pool: {0}")]
    Pool(#[from] r2d2::Error),

    /// Constraint violation outside the insert-or-replace paths, e.g. a node id
    /// already stored for a different conversation.
    #[error("constraint violation: {0}")]
    Constraint(#[source] rusqlite::Error),

    /// A node id in the batch is already stored for another conversation.
    #[error(
        "node {node_id} of conversation {conversation_id} is already stored for conversation {owner}"
    )]
    NodeOwnedElsewhere { node_id: String, conversation_id: String, owner: String },

    /// A stored value could not be decoded into its domain type.
    #[error("invalid stored data: {0}")]
    InvalidData(#[source] rusqlite::Error),

    /// Any other SQL or disk failure.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),
}

impl StorageError {
    /// Whether this error is likely transient (worth retrying).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Busy(_) | Self::Pool(_))
    }

    /// Whether this error is a constraint violation.
    #[must_use]
    pub const fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_) | Self::NodeOwnedElsewhere { .. })
    }
}

/// Custom `From<rusqlite::Error>`, not a blanket `#[from]`.
///
/// - `SQLITE_BUSY` / `SQLITE_LOCKED` → `Busy`
/// - `SQLITE_CONSTRAINT` → `Constraint`
/// - column conversion failures → `InvalidData`
/// - Everything else → `Database`
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => Self::Busy(err),
            Some(ErrorCode::ConstraintViolation) => Self::Constraint(err),
            _ if matches!(
                err,
                rusqlite::Error::FromSqlConversionFailure(..)
                    | rusqlite::Error::InvalidColumnType(..)
            ) =>
            {
                Self::InvalidData(err)
            },
            _ => Self::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(code: std::os::raw::c_int) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None)
    }

    #[test]
    fn test_busy_and_locked_are_transient() {
        let busy = StorageError::from(sqlite_failure(rusqlite::ffi::SQLITE_BUSY));
        assert!(matches!(busy, StorageError::Busy(_)));
        assert!(busy.is_transient());

        let locked = StorageError::from(sqlite_failure(rusqlite::ffi::SQLITE_LOCKED));
        assert!(locked.is_transient());
    }

    #[test]
    fn test_constraint_is_fatal() {
        let err = StorageError::from(sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT));
        assert!(err.is_constraint());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_io_failure_is_fatal() {
        let err = StorageError::from(sqlite_failure(rusqlite::ffi::SQLITE_IOERR));
        assert!(matches!(err, StorageError::Database(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_conversion_failure_is_invalid_data() {
        let err = StorageError::from(rusqlite::Error::InvalidColumnType(
            0,
            "created_at".to_owned(),
            rusqlite::types::Type::Integer,
        ));
        assert!(matches!(err, StorageError::InvalidData(_)));
    }
}
