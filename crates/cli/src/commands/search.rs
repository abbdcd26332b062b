use std::path::Path;

use anyhow::Result;

use crate::open_storage;

pub(crate) fn run_search(db_path: &Path, query: &str, limit: usize) -> Result<()> {
    let storage = open_storage(db_path)?;
    let results = storage.search_messages(query, limit)?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

pub(crate) fn run_stats(db_path: &Path) -> Result<()> {
    let storage = open_storage(db_path)?;
    let stats = storage.get_stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

pub(crate) fn run_runs(db_path: &Path, limit: usize) -> Result<()> {
    let storage = open_storage(db_path)?;
    let runs = storage.list_runs(limit)?;
    println!("{}", serde_json::to_string_pretty(&runs)?);
    Ok(())
}
