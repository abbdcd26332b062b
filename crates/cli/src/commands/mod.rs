pub(crate) mod analyze;
pub(crate) mod ingest;
pub(crate) mod search;
