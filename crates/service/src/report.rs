//! Markdown rendering of an analysis summary.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::{AnalysisSummary, ServiceError};

/// Render `summary` as a Markdown document.
#[must_use]
pub fn render_report(summary: &AnalysisSummary) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "# Intent Archaeology Report\n");
    let _ = writeln!(out, "Projects analysed: {}\n", summary.projects.len());
    for project in &summary.projects {
        let title = project.title.as_deref().filter(|t| !t.is_empty()).unwrap_or("(untitled)");
        let _ = writeln!(out, "## {title}\n");
        let _ = writeln!(out, "- Project id: `{}`", project.project_id);
        let _ = writeln!(out, "- Nodes: {}\n", project.node_ids.len());
        if project.ghost_problems.is_empty() {
            let _ = writeln!(out, "No ghost problems detected.\n");
            continue;
        }
        let _ = writeln!(out, "### Ghost problems\n");
        for problem in &project.ghost_problems {
            let _ = writeln!(
                out,
                "- {} (evidence: {})",
                problem.description,
                problem.evidence.join(", ")
            );
        }
        out.push('\n');
    }
    out
}

/// Render the summary stored at `findings` into `out`, creating parent
/// directories. Returns the number of projects written.
///
/// # Errors
/// Returns error if the findings cannot be read or the report cannot be written.
pub fn write_report(findings: &Path, out: &Path) -> Result<usize, ServiceError> {
    let summary = AnalysisSummary::load(findings)?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(out, render_report(&summary))?;
    tracing::info!(projects = summary.projects.len(), out = %out.display(), "Report written");
    Ok(summary.projects.len())
}
