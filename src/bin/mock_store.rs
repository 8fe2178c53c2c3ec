//! Mock hierarchy store binary for local dry runs
//!
//! Serves the store/fetch contract from memory so the harness can be
//! exercised without a real storage service.

use clap::Parser;
use hierarchy_harness::common::logging;
use hierarchy_harness::mock::{MockStore, RunningMockStore};

#[derive(Parser)]
#[command(name = "mock-store", about = "In-memory hierarchy store for harness dry runs")]
#[command(version, long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Endpoint path segment
    #[arg(long, default_value = "hierarchy")]
    endpoint: String,

    /// Return every array reversed, so round-trips report mismatches
    #[arg(long)]
    reverse_arrays: bool,

    /// Log every request
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    logging::init_cli(args.verbose);

    let store = MockStore::new(&args.endpoint, args.reverse_arrays);
    let running = match RunningMockStore::start(&format!("{}:{}", args.host, args.port), store) {
        Ok(running) => running,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "Mock store listening on {}/{}",
        running.base_url(),
        args.endpoint.trim_matches('/')
    );
    running.wait();
}
