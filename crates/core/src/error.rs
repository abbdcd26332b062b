use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading a conversation export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export file could not be opened.
    #[error("cannot open export {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from an already-open export failed.
    #[error("read failed at byte {offset}: {source}")]
    Read {
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// The export is not a well-formed array of conversation objects.
    /// `offset` is the byte position where the problem was noticed and
    /// `record` the zero-based index of the array element being read.
    #[error("malformed export at byte {offset} (record {record}): {message}")]
    Parse { offset: u64, record: usize, message: String },
}

impl ExportError {
    /// Whether this is an I/O failure rather than malformed content.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Open { .. } | Self::Read { .. })
    }
}
