//! Test outcomes and the end-of-run report

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use crate::common::Error;
use crate::oracle::Difference;

/// Kind code recorded when the retrieved hierarchy does not match
pub const MISMATCH: &str = "MISMATCH";

/// Result of one fixture's round-trip
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    /// Fixture file name
    pub name: String,
    pub passed: bool,
    /// Error code, e.g. `STORE_FAILURE` or `MISMATCH`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Payload read from disk, kept only on mismatch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<Value>,
    /// Payload returned by the service, kept only on mismatch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieved: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<Difference>,
}

impl TestOutcome {
    pub fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            kind: None,
            error: None,
            original: None,
            retrieved: None,
            difference: None,
        }
    }

    /// Failed outcome caused by a harness or service error
    pub fn error(name: &str, error: &Error) -> Self {
        Self {
            kind: Some(error.code().to_string()),
            error: Some(error.to_string()),
            ..Self::failed(name)
        }
    }

    /// Failed outcome where both calls succeeded but the documents differ
    pub fn mismatch(
        name: &str,
        original: Value,
        retrieved: Value,
        difference: Option<Difference>,
    ) -> Self {
        Self {
            kind: Some(MISMATCH.to_string()),
            error: Some("Hierarchies don't match".to_string()),
            original: Some(original),
            retrieved: Some(retrieved),
            difference,
            ..Self::failed(name)
        }
    }

    fn failed(name: &str) -> Self {
        Self {
            passed: false,
            ..Self::pass(name)
        }
    }

    pub fn is_mismatch(&self) -> bool {
        self.kind.as_deref() == Some(MISMATCH)
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub outcomes: Vec<TestOutcome>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: TestOutcome) {
        self.total += 1;
        if outcome.passed {
            self.passed += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    /// True when every attempted fixture passed
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    /// Print the summary with failure details to stdout
    pub fn print(&self) {
        println!("\n{}", "Summary:".cyan().bold());

        for outcome in self.failures() {
            let kind = outcome.kind.as_deref().unwrap_or("FAILED");
            println!(
                "  {} {} [{}] {}",
                "✗".red(),
                outcome.name.white().bold(),
                kind.red(),
                outcome.error.as_deref().unwrap_or("")
            );
            if let Some(diff) = &outcome.difference {
                println!("    {}", diff.to_string().dimmed());
            }
            if let (Some(original), Some(retrieved)) = (&outcome.original, &outcome.retrieved) {
                print_payload("Original:", original);
                print_payload("Retrieved:", retrieved);
            }
        }

        let line = format!("Passed {}/{}", self.passed, self.total);
        if self.all_passed() {
            println!("\n{} {}\n", "✓".green().bold(), line.green().bold());
        } else {
            println!(
                "\n{} {} ({} failed)\n",
                "✗".red().bold(),
                line.red().bold(),
                self.failed()
            );
        }
    }

    /// Report as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn print_payload(label: &str, value: &Value) {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    println!("    {}", label.yellow());
    for line in pretty.lines() {
        println!("      {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_counts_passes_and_failures() {
        let mut summary = RunSummary::default();
        summary.record(TestOutcome::pass("1.json"));
        summary.record(TestOutcome::error(
            "2.json",
            &Error::FetchFailure("HTTP 404 Not Found".into()),
        ));

        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.all_passed());
        assert_eq!(summary.failures().next().unwrap().name, "2.json");
    }

    #[test]
    fn test_empty_run_counts_as_all_passed() {
        assert!(RunSummary::default().all_passed());
    }

    #[test]
    fn test_json_report_omits_empty_fields() {
        let mut summary = RunSummary::default();
        summary.record(TestOutcome::pass("1.json"));
        summary.record(TestOutcome::mismatch(
            "2.json",
            json!({"id": 2, "c": [1, 2]}),
            json!({"id": 2, "c": [2, 1]}),
            None,
        ));

        let report: Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(report["total"], 2);
        assert_eq!(report["passed"], 1);
        assert_eq!(report["outcomes"][0], json!({"name": "1.json", "passed": true}));
        assert_eq!(report["outcomes"][1]["kind"], MISMATCH);
        assert_eq!(report["outcomes"][1]["retrieved"]["c"], json!([2, 1]));
    }
}
