//! Full-text search over message content.

mod text_search;

/// Turns free text into an FTS5 query: every word becomes a quoted prefix
/// term and all terms must match.
pub(crate) fn build_fts_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|word| word.replace('"', ""))
        .filter(|word| !word.is_empty())
        .map(|word| format!("\"{word}\"*"))
        .collect::<Vec<_>>()
        .join(" AND ")
}
