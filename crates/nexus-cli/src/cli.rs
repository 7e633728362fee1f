use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nexus")]
#[command(about = "Inspect and maintain the Nexus offline sync queue")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the persisted queue file
    #[arg(long, global = true, value_name = "PATH")]
    pub queue_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show queue length and per-collection counts
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List pending operations, oldest first
    List {
        /// Number of operations to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop every pending operation
    Clear,
}
