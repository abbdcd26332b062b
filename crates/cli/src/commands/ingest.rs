use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use ia_core::config::RetryPolicy;
use ia_service::IngestService;

use crate::open_storage;

pub(crate) fn run_ingest(db_path: &Path, input: &Path) -> Result<()> {
    let storage = Arc::new(open_storage(db_path)?);
    let service = IngestService::new(storage, RetryPolicy::from_env());
    let report = service
        .ingest_file(input)
        .with_context(|| format!("ingesting {}", input.display()))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn run_init_db(db_path: &Path) -> Result<()> {
    open_storage(db_path)?;
    println!("Database initialized at {}", db_path.display());
    Ok(())
}

pub(crate) fn run_build(db_path: &Path) -> Result<()> {
    let storage = open_storage(db_path)?;
    storage.vacuum().context("vacuuming database")?;
    println!("Database optimized at {}", db_path.display());
    Ok(())
}
