use rusqlite::{Connection, OptionalExtension as _, params};

use super::{Storage, get_conn};
use crate::StorageError;

pub(crate) fn upsert_state(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO state (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

impl Storage {
    /// Set a key/value pair, replacing any previous value.
    ///
    /// # Errors
    /// Returns error if database write fails.
    pub fn set_state(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_write_tx(|tx| upsert_state(tx, key, value))
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_state(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let value = conn
            .query_row("SELECT value FROM state WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }
}
