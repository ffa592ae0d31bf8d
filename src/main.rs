//! # Hermes Sync CLI (`hermes-sync`)
//!
//! Runs the Hermes connector from the command line and writes emitted
//! batches as JSON Lines.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hermes-sync check` | Show connector configuration and credential status |
//! | `hermes-sync load` | Full historical load |
//! | `hermes-sync poll` | Load records updated within a time window |
//!
//! ## Examples
//!
//! ```bash
//! # Full load into a file
//! HERMES_ACCESS_TOKEN=... hermes-sync load --config ./config/hermes.toml
//!
//! # Poll the last hour, leaving the checkpoint untouched
//! hermes-sync poll --start 1704063600 --end 1704067200 --dry-run
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hermes_connector::config;
use hermes_connector::progress::ProgressMode;
use hermes_connector::sources;
use hermes_connector::sync::{run_sync, SyncMode};

/// Hermes Sync: pull Hermes threads and spaces as batched documents.
#[derive(Parser)]
#[command(
    name = "hermes-sync",
    about = "Pull Hermes threads and spaces as normalized, batched documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/hermes.toml`. Built-in defaults are used when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/hermes.toml")]
    config: PathBuf,

    /// Progress output on stderr. Defaults to `human` on a TTY, otherwise `off`.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show connector configuration and credential status.
    Check,

    /// Run a full historical load of every thread and space.
    Load {
        /// Fetch and normalize without writing output.
        #[arg(long)]
        dry_run: bool,
    },

    /// Load threads and spaces updated within `[start, end]`.
    ///
    /// Bounds are seconds since the Unix epoch. `--start` defaults to the
    /// stored checkpoint (or 0) and `--end` to now. A successful poll
    /// advances the checkpoint to `--end`.
    Poll {
        #[arg(long)]
        start: Option<f64>,

        #[arg(long)]
        end: Option<f64>,

        /// Fetch and normalize without writing output or the checkpoint.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config_or_default(&cli.config)?;
    let reporter = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    match cli.command {
        Commands::Check => {
            sources::list_sources(&cfg);
        }
        Commands::Load { dry_run } => {
            run_sync(&cfg, SyncMode::Load, dry_run, reporter.as_ref()).await?;
        }
        Commands::Poll {
            start,
            end,
            dry_run,
        } => {
            run_sync(
                &cfg,
                SyncMode::Poll { start, end },
                dry_run,
                reporter.as_ref(),
            )
            .await?;
        }
    }

    Ok(())
}
