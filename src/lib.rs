//! Hierarchy Harness - round-trip conformance checks for hierarchy storage
//!
//! Stores each fixture hierarchy through a service's HTTP API, fetches it
//! back by root id, and checks the two are structurally equivalent.

pub mod cli;
pub mod client;
pub mod commands;
pub mod common;
pub mod fixtures;
#[cfg(feature = "mock-store")]
pub mod mock;
pub mod oracle;
pub mod testing;

// Re-export commonly used types for tests
pub use client::{HierarchyClient, HierarchyService, StoreAck};
pub use common::{Error, Result};
pub use oracle::{equivalent, first_difference};
pub use testing::{run_suite, RunOptions, RunSummary};
