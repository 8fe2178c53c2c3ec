//! Hierarchy Harness - round-trip conformance checks for hierarchy storage
//!
//! Exits 0 when every fixture round-trips, 1 otherwise.

use clap::Parser;
use commands::Commands;
use hierarchy_harness::common::logging;
use hierarchy_harness::{cli, commands};

#[derive(Parser)]
#[command(name = "hierarchy-harness", about = "Round-trip conformance harness for hierarchy storage")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    logging::init_cli(verbose);

    match cli::dispatch(cli.command).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
