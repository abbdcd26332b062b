use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use ia_service::{AnalysisService, write_report};

use crate::open_storage;

pub(crate) fn run_analyze(db_path: &Path, out: &Path) -> Result<()> {
    let storage = Arc::new(open_storage(db_path)?);
    let summary = AnalysisService::new(storage).analyze().context("analyzing conversations")?;
    summary.write(out).with_context(|| format!("writing {}", out.display()))?;
    println!("Analysis complete. Wrote {} projects to {}", summary.projects.len(), out.display());
    Ok(())
}

pub(crate) fn run_report(findings: &Path, out: &Path) -> Result<()> {
    let projects = write_report(findings, out)
        .with_context(|| format!("rendering {} into {}", findings.display(), out.display()))?;
    println!("Report with {projects} projects written to {}", out.display());
    Ok(())
}
