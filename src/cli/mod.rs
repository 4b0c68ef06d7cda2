//! CLI entry point: parses arguments and dispatches to command modules.
//! Mirrors the teacher's `Cli`/`Commands`/`run()` shape (`cli/commands/mod.rs`)
//! but with the much smaller surface this appliance needs — a web process,
//! a worker process driven separately via the `lka-worker` binary, and a
//! handful of operator commands for migrations and orphan recovery.

mod commands;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "lka")]
#[command(about = "Local knowledge appliance: document ingestion and hybrid search")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled, without going through clap — used by
/// `main` to configure the tracing filter before `Cli::parse()` runs.
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run pending database migrations
    Migrate,

    /// Start the web server (API, search, SSE progress stream)
    Serve {
        /// Address to bind to, e.g. 127.0.0.1:3030 (default: settings' bind_address)
        bind: Option<String>,
    },

    /// Re-enqueue jobs stuck `running` past their stage timeout
    Reap,

    /// Restart a version's pipeline from the extract stage
    Reprocess {
        /// Version id to restart
        version_id: Uuid,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Commands::Migrate => commands::migrate::cmd_migrate(&settings).await,
        Commands::Serve { bind } => commands::serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Reap => commands::reap::cmd_reap(&settings).await,
        Commands::Reprocess { version_id } => commands::reprocess::cmd_reprocess(&settings, version_id).await,
    }
}
