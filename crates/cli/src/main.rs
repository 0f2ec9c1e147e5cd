//! Hatchling CLI — the main entry point.
//!
//! Commands:
//! - `session` — Run one autonomous session
//! - `status`  — Show the progression snapshot
//! - `doctor`  — Diagnose configuration and collaborators

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "hatchling",
    about = "Hatchling — autonomous agent session engine",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to hatchling.toml
    #[arg(short, long, global = true, default_value = "hatchling.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one autonomous session
    Session {
        /// Override the action budget
        #[arg(short, long)]
        budget: Option<u32>,

        /// Use the built-in scripted decision source
        #[arg(long)]
        scripted: bool,
    },

    /// Show the progression snapshot
    Status,

    /// Diagnose configuration and collaborator reachability
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Session { budget, scripted } => {
            commands::session::run(&cli.config, budget, scripted).await?
        }
        Commands::Status => commands::status::run(&cli.config)?,
        Commands::Doctor => commands::doctor::run(&cli.config).await?,
    }

    Ok(())
}
