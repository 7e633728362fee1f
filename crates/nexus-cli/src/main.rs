//! Nexus CLI - inspect and maintain the offline sync queue
//!
//! Operates directly on the persisted queue file, so it works without a
//! backend connection.

mod cli;
mod commands;
mod error;

use std::env;
use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::clear::run_clear;
use crate::commands::list::run_list;
use crate::commands::status::run_status;
use crate::error::CliError;

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nexus=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let queue_path = resolve_queue_path(cli.queue_path)?;
    tracing::debug!("Using queue file {}", queue_path.display());

    match cli.command {
        Commands::Status { json } => run_status(json, &queue_path)?,
        Commands::List { limit, json } => run_list(limit, json, &queue_path)?,
        Commands::Clear => run_clear(&queue_path)?,
    }

    Ok(())
}

fn resolve_queue_path(cli_queue_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    cli_queue_path
        .or_else(|| env::var_os("NEXUS_QUEUE_PATH").map(PathBuf::from))
        .or_else(default_queue_path)
        .ok_or(CliError::NoQueuePath)
}

fn default_queue_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("nexus").join("sync-queue.json"))
}
