//! Suite runner
//!
//! Drives each fixture through store, fetch and compare, one at a time.
//! Only discovery errors abort the run; anything that goes wrong inside a
//! fixture becomes that fixture's failed outcome.

use std::path::Path;

use colored::Colorize;

use crate::client::HierarchyService;
use crate::common::Result;
use crate::fixtures::{list_fixtures, load_fixture, FixtureEntry};
use crate::oracle::{equivalent, first_difference};

use super::report::{RunSummary, TestOutcome};

/// Options controlling runner output
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Print per-fixture progress lines to stdout
    pub progress: bool,
    /// Include store status and root id in progress lines
    pub verbose: bool,
}

/// Run every fixture in `dir` against `service`
///
/// Returns the summary for the caller to report and to derive an exit
/// status from. Fails without contacting the service if the fixtures
/// cannot be discovered or ordered.
pub async fn run_suite(
    dir: &Path,
    service: &dyn HierarchyService,
    options: RunOptions,
) -> Result<RunSummary> {
    let fixtures = list_fixtures(dir)?;
    tracing::info!(dir = %dir.display(), fixtures = fixtures.len(), "starting run");

    let mut summary = RunSummary::default();
    for fixture in &fixtures {
        if options.progress {
            println!(
                "\n{} {}",
                "Testing fixture:".blue().bold(),
                fixture.name.white().bold()
            );
        }

        let outcome = run_fixture(fixture, service, options).await;

        if options.progress {
            print_outcome(&outcome);
        }
        summary.record(outcome);
    }

    Ok(summary)
}

/// Run a single fixture through the store/fetch/compare cycle
pub async fn run_fixture(
    fixture: &FixtureEntry,
    service: &dyn HierarchyService,
    options: RunOptions,
) -> TestOutcome {
    match round_trip(fixture, service, options).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(fixture = %fixture.name, code = e.code(), "fixture failed: {}", e);
            TestOutcome::error(&fixture.name, &e)
        }
    }
}

async fn round_trip(
    fixture: &FixtureEntry,
    service: &dyn HierarchyService,
    options: RunOptions,
) -> Result<TestOutcome> {
    let loaded = load_fixture(&fixture.path)?;

    let ack = service.store(&loaded.hierarchy).await?;
    if options.verbose {
        println!("  Store response status: {}", ack.status.to_string().dimmed());
    }

    let retrieved = service.fetch(loaded.root_id).await?;
    if options.verbose {
        println!("  Fetched root id: {}", loaded.root_id.to_string().dimmed());
    }

    if equivalent(&loaded.hierarchy, &retrieved) {
        return Ok(TestOutcome::pass(&fixture.name));
    }

    let difference = first_difference(&loaded.hierarchy, &retrieved);
    tracing::warn!(
        fixture = %fixture.name,
        root_id = loaded.root_id,
        "retrieved hierarchy differs from original"
    );
    Ok(TestOutcome::mismatch(
        &fixture.name,
        loaded.hierarchy,
        retrieved,
        difference,
    ))
}

fn print_outcome(outcome: &TestOutcome) {
    if outcome.passed {
        println!("  {} Hierarchies match", "✓".green());
        return;
    }

    let message = outcome.error.as_deref().unwrap_or("failed");
    match &outcome.difference {
        Some(diff) if outcome.is_mismatch() => {
            println!("  {} {} ({})", "✗".red(), message, diff.to_string().dimmed())
        }
        _ => println!("  {} {}", "✗".red(), message),
    }
}
