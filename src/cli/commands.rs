//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tunelake pipeline CLI
#[derive(Parser, Debug)]
#[command(name = "tunelake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML). Falls back to TUNELAKE_* env vars.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: song catalog first, then event logs
    Run,

    /// Run only the Song-Catalog Transform (songs + artists)
    Songs,

    /// Run only the Event-Log Transform (users + time + songplays).
    /// Fails if the song catalog has not been written yet.
    Events,

    /// Insert computed rows into a warehouse fact table and log a sample
    LoadFact {
        /// DuckDB database path, or ":memory:"
        #[arg(long, default_value = ":memory:")]
        database: String,

        /// Destination table name
        #[arg(long)]
        table: String,

        /// SELECT fragment producing the rows to insert
        #[arg(long)]
        select: String,
    },

    /// Parse the configuration and print the resolved values
    Validate,
}
