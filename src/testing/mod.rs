//! Round-trip test runner
//!
//! Sequences fixtures through the hierarchy client and the equality
//! oracle, then reports per-fixture outcomes and pass/total counts.

mod report;
mod runner;

pub use report::{RunSummary, TestOutcome, MISMATCH};
pub use runner::{run_fixture, run_suite, RunOptions};
