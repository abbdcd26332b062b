use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, params};

use super::state::upsert_state;
use super::{Storage, get_conn};
use crate::{IngestRun, NewIngestRun, StorageError};

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<IngestRun> {
    let started_at: String = row.get(1)?;
    let finished_at: String = row.get(2)?;
    let added: i64 = row.get(4)?;
    let updated: i64 = row.get(5)?;
    let skipped: i64 = row.get(6)?;
    Ok(IngestRun {
        id: row.get(0)?,
        started_at: parse_timestamp(1, &started_at)?,
        finished_at: parse_timestamp(2, &finished_at)?,
        input_path: row.get(3)?,
        added: added as u64,
        updated: updated as u64,
        skipped: skipped as u64,
    })
}

fn insert_run(conn: &Connection, run: &NewIngestRun) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO ingest_runs
           (started_at, finished_at, input_path,
            added_conversations, updated_conversations, skipped_conversations)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            format_timestamp(&run.started_at),
            format_timestamp(&run.finished_at),
            run.input_path,
            run.added as i64,
            run.updated as i64,
            run.skipped as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl Storage {
    /// Append one ingest run record. Returns its id.
    ///
    /// # Errors
    /// Returns error if database write fails.
    pub fn record_run(&self, run: &NewIngestRun) -> Result<i64, StorageError> {
        self.record_run_with_state(run, &[])
    }

    /// Append one ingest run record and set the given state keys in the same
    /// transaction. Returns the run id.
    ///
    /// # Errors
    /// Returns error if database write fails; neither the run nor the state is kept.
    pub fn record_run_with_state(
        &self,
        run: &NewIngestRun,
        state: &[(&str, &str)],
    ) -> Result<i64, StorageError> {
        let id = self.with_write_tx(|tx| {
            let id = insert_run(tx, run)?;
            for (key, value) in state {
                upsert_state(tx, key, value)?;
            }
            Ok(id)
        })?;
        tracing::info!(
            run_id = id,
            added = run.added,
            updated = run.updated,
            skipped = run.skipped,
            "Recorded ingest run"
        );
        Ok(id)
    }

    /// Most recent runs first.
    ///
    /// # Errors
    /// Returns error if database query fails or a stored timestamp is malformed.
    pub fn list_runs(&self, limit: usize) -> Result<Vec<IngestRun>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, started_at, finished_at, input_path,
                    added_conversations, updated_conversations, skipped_conversations
               FROM ingest_runs
               ORDER BY id DESC
               LIMIT ?1",
        )?;
        let runs = stmt
            .query_map(params![limit as i64], row_to_run)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(runs)
    }
}
