//! Incremental ingestion: stream an export, skip conversations whose
//! fingerprint is unchanged, rewrite the rest one transaction at a time.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use ia_core::config::RetryPolicy;
use ia_core::constants::{STATE_LAST_INGEST_FINISHED_AT, STATE_LAST_INGEST_INPUT};
use ia_core::{Conversation, ConversationRow, ExportError, ExportReader, fingerprint, flatten};
use ia_storage::{NewIngestRun, Storage, WriteMode};
use serde::{Deserialize, Serialize};

use crate::ServiceError;
use crate::retry::with_retry;

/// Outcome of one ingest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub run_id: i64,
    pub input_path: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub added: u64,
    pub updated: u64,
    pub skipped: u64,
}

impl IngestReport {
    /// Conversations with an identity seen in this run.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.added + self.updated + self.skipped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Added,
    Updated,
    Skipped,
}

#[derive(Debug, Default)]
struct Counts {
    added: u64,
    updated: u64,
    skipped: u64,
}

impl Counts {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Added => self.added += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

pub struct IngestService {
    storage: Arc<Storage>,
    retry: RetryPolicy,
}

impl IngestService {
    #[must_use]
    pub const fn new(storage: Arc<Storage>, retry: RetryPolicy) -> Self {
        Self { storage, retry }
    }

    /// Ingest every conversation of the export at `path`.
    ///
    /// # Errors
    /// Returns error if the export cannot be read or is malformed, or a store
    /// operation fails. Conversations committed before the failure stay; no
    /// run record is written.
    pub fn ingest_file(&self, path: &Path) -> Result<IngestReport, ServiceError> {
        let canonical = path
            .canonicalize()
            .map_err(|source| ExportError::Open { path: path.to_path_buf(), source })?;
        let mut reader = ExportReader::open(&canonical)?;
        let report = self.ingest_records(&canonical.display().to_string(), reader.by_ref())?;
        tracing::debug!(
            bytes = reader.offset(),
            records = reader.records_read(),
            "Export fully consumed"
        );
        Ok(report)
    }

    /// Ingest a stream of decoded records, in order, then record the run.
    ///
    /// # Errors
    /// Returns the first decode or fatal store error; see [`Self::ingest_file`].
    pub fn ingest_records<I>(&self, input_path: &str, records: I) -> Result<IngestReport, ServiceError>
    where
        I: IntoIterator<Item = Result<Conversation, ExportError>>,
    {
        let started_at = Utc::now();
        tracing::info!(input = input_path, "Ingest started");

        let mut counts = Counts::default();
        for record in records {
            let conversation = record?;
            if let Some(outcome) = self.ingest_conversation(&conversation)? {
                counts.record(outcome);
            }
        }

        let finished_at = Utc::now();
        let run = NewIngestRun {
            started_at,
            finished_at,
            input_path: input_path.to_owned(),
            added: counts.added,
            updated: counts.updated,
            skipped: counts.skipped,
        };
        let finished = finished_at.to_rfc3339_opts(SecondsFormat::Micros, true);
        let state = [
            (STATE_LAST_INGEST_FINISHED_AT, finished.as_str()),
            (STATE_LAST_INGEST_INPUT, input_path),
        ];
        let run_id =
            with_retry(self.retry, "record run", || self.storage.record_run_with_state(&run, &state))?;

        tracing::info!(
            run_id,
            added = counts.added,
            updated = counts.updated,
            skipped = counts.skipped,
            "Ingest finished"
        );
        Ok(IngestReport {
            run_id,
            input_path: run.input_path,
            started_at,
            finished_at,
            added: counts.added,
            updated: counts.updated,
            skipped: counts.skipped,
        })
    }

    /// Returns `None` for a record without identity.
    fn ingest_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Option<Outcome>, ServiceError> {
        let Some(id) = conversation.identity() else {
            tracing::debug!(title = ?conversation.title, "Skipping record without id");
            return Ok(None);
        };

        let digest = fingerprint(conversation);
        let stored = with_retry(self.retry, "fingerprint lookup", || self.storage.get_fingerprint(id))?;
        let (outcome, mode) = match stored {
            Some(previous) if previous == digest => {
                tracing::debug!(conversation_id = id, "Unchanged, skipping");
                return Ok(Some(Outcome::Skipped));
            },
            Some(_) => (Outcome::Updated, WriteMode::Replace),
            None => (Outcome::Added, WriteMode::Insert),
        };

        let row = ConversationRow::from_export(id, conversation, digest);
        let tree = flatten(id, &conversation.mapping);
        with_retry(self.retry, "conversation write", || {
            self.storage.write_conversation(&row, &tree, mode)
        })?;

        tracing::debug!(
            conversation_id = id,
            outcome = ?outcome,
            nodes = tree.nodes.len(),
            edges = tree.edges.len(),
            "Conversation stored"
        );
        Ok(Some(outcome))
    }
}
