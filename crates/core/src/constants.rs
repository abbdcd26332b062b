//! Shared constants for intent-archaeology.

/// Read buffer for streaming exports.
pub const EXPORT_READ_BUFFER_BYTES: usize = 64 * 1024;

/// Default number of results for search and listing commands.
pub const DEFAULT_QUERY_LIMIT: usize = 20;

/// Maximum number of results for any query.
pub const MAX_QUERY_LIMIT: usize = 1000;

/// State key holding the finish time of the last successful ingest.
pub const STATE_LAST_INGEST_FINISHED_AT: &str = "last_ingest_finished_at";

/// State key holding the input path of the last successful ingest.
pub const STATE_LAST_INGEST_INPUT: &str = "last_ingest_input";

/// Phrases in a trailing user message that suggest an unresolved problem.
pub const GHOST_KEYWORDS: &[&str] = &[
    "error",
    "exception",
    "traceback",
    "failed",
    "403",
    "404",
    "not working",
    "doesn't work",
    "didn't work",
];
