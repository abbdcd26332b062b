//! Service layer for intent-archaeology
//!
//! Centralizes ingestion and analysis between the CLI and storage.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod analysis_service;
mod error;
mod ingest_service;
mod report;
mod retry;

pub use analysis_service::{AnalysisService, AnalysisSummary, GhostProblem, Project};
pub use error::ServiceError;
pub use ingest_service::{IngestReport, IngestService};
pub use report::{render_report, write_report};
pub use retry::with_retry;
