use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use ia_core::config::{StoreConfig, db_path_from_env};
use ia_core::constants::DEFAULT_QUERY_LIMIT;
use ia_storage::Storage;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ia")]
#[command(about = "Intent Archaeology: incremental ingestion and search of chat conversation exports", long_about = None)]
struct Cli {
    /// Database file (defaults to $IA_DB_PATH, then the user data directory)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a conversation export, skipping unchanged conversations
    Ingest {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Create the database and its tables
    InitDb,
    /// Compact the database and optimize the search index
    Build,
    /// Summarize projects and ghost problems as JSON
    Analyze {
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Render an analysis JSON file as Markdown
    Report {
        #[arg(short, long)]
        findings: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Full-text search over message content
    Search {
        query: String,
        #[arg(short, long, default_value_t = DEFAULT_QUERY_LIMIT)]
        limit: usize,
    },
    /// Row counts of every table
    Stats,
    /// Most recent ingest runs
    Runs {
        #[arg(short, long, default_value_t = DEFAULT_QUERY_LIMIT)]
        limit: usize,
    },
}

pub(crate) fn get_db_path(cli_override: Option<PathBuf>) -> PathBuf {
    cli_override.or_else(db_path_from_env).unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("intent-archaeology")
            .join("ia.db")
    })
}

pub(crate) fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }
    Ok(())
}

pub(crate) fn open_storage(db_path: &Path) -> Result<Storage> {
    ensure_db_dir(db_path)?;
    Storage::with_config(db_path, StoreConfig::from_env())
        .with_context(|| format!("opening database {}", db_path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = get_db_path(cli.db_path);

    match cli.command {
        Commands::Ingest { input } => commands::ingest::run_ingest(&db_path, &input),
        Commands::InitDb => commands::ingest::run_init_db(&db_path),
        Commands::Build => commands::ingest::run_build(&db_path),
        Commands::Analyze { out } => commands::analyze::run_analyze(&db_path, &out),
        Commands::Report { findings, out } => commands::analyze::run_report(&findings, &out),
        Commands::Search { query, limit } => commands::search::run_search(&db_path, &query, limit),
        Commands::Stats => commands::search::run_stats(&db_path),
        Commands::Runs { limit } => commands::search::run_runs(&db_path, limit),
    }
}
