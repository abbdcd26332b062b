//! `SQLite` storage implementation
//!
//! All methods are synchronous. Each public operation runs in its own
//! transaction; `write_conversation` groups a whole conversation rewrite into
//! one.

// SQLite uses i64 for counts, Rust uses u64/usize - safe conversions within DB context
#![allow(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "SQLite i64 <-> Rust u64/usize conversions are safe within DB row counts"
)]

mod conversations;
mod nodes;
mod runs;
mod search;
mod state;
mod stats;

use std::path::Path;

use ia_core::config::StoreConfig;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::StorageError;
use crate::schema;

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Main storage struct wrapping `SQLite` connection pool
#[derive(Clone, Debug)]
pub struct Storage {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

/// Get a connection from the pool
pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn, StorageError> {
    Ok(pool.get()?)
}

/// Log row read errors and filter them out
pub(crate) fn log_row_error<T>(result: rusqlite::Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("Row read error: {}", e);
            None
        },
    }
}

/// Per-connection settings: WAL so readers never block on the writer,
/// enforced foreign keys, and a busy timeout before `SQLITE_BUSY` surfaces.
fn init_connection(conn: &mut Connection, config: StoreConfig) -> Result<(), rusqlite::Error> {
    conn.busy_timeout(config.busy_timeout)?;
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        tracing::warn!(journal_mode = %mode, "WAL journal mode unavailable");
    }
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(())
}

impl Storage {
    /// Open (creating if needed) the database at `db_path` with settings from
    /// the environment.
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or the schema cannot be created.
    pub fn new(db_path: &Path) -> Result<Self, StorageError> {
        Self::with_config(db_path, StoreConfig::from_env())
    }

    /// Open the database at `db_path` with explicit settings.
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or the schema cannot be created.
    pub fn with_config(db_path: &Path, config: StoreConfig) -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::file(db_path)
            .with_init(move |conn| init_connection(conn, config));

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(config.pool_timeout)
            .build(manager)?;

        let storage = Self { pool };
        storage.initialize()?;

        tracing::info!(
            path = %db_path.display(),
            pool_size = config.pool_size,
            "Storage initialized with connection pool"
        );
        Ok(storage)
    }

    /// Create any missing tables and indexes. Safe to call repeatedly.
    ///
    /// # Errors
    /// Returns error if a DDL statement fails.
    pub fn initialize(&self) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        schema::initialize(&conn)?;
        Ok(())
    }

    /// Run `f` inside an immediate (write-locking) transaction, committing on
    /// success. Dropping the transaction on error rolls everything back.
    pub(crate) fn with_write_tx<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}
