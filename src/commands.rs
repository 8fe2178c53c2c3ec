//! CLI command definitions
//!
//! Defines the clap commands for the hierarchy harness.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Store, fetch and compare every fixture against the service
    Run {
        /// Directory containing <n>.json fixtures (default: tests/objects)
        #[arg(long, short)]
        dir: Option<PathBuf>,

        #[command(flatten)]
        service: ServiceArgs,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,
    },

    /// List fixtures in execution order without contacting the service
    List {
        /// Directory containing <n>.json fixtures (default: tests/objects)
        #[arg(long, short)]
        dir: Option<PathBuf>,

        /// Path to a config file (default: platform config dir)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two local JSON documents with the structural-equality check
    Compare {
        /// Expected document
        expected: PathBuf,

        /// Actual document
        actual: PathBuf,
    },
}

/// Overrides for the `[service]` and `[timeouts]` config sections
#[derive(Args, Debug, Default)]
pub struct ServiceArgs {
    /// Target hostname
    #[arg(long)]
    pub host: Option<String>,

    /// Target port
    #[arg(long)]
    pub port: Option<u16>,

    /// Endpoint path segment for store and fetch
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds (0 = transport default)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Path to a config file (default: platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
