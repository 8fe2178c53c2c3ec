//! Error types for the hierarchy harness
//!
//! The harness branches on error kind rather than message text: every
//! variant carries its cause as a string and maps to a stable code that
//! shows up in reports.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the hierarchy harness
#[derive(Error, Debug)]
pub enum Error {
    // === Fixture Discovery Errors (fatal) ===
    #[error("Fixture '{file}' cannot be ordered: {reason}")]
    FixtureNaming { file: String, reason: String },

    #[error("Cannot read fixture directory '{path}': {error}")]
    FixtureDir { path: String, error: String },

    // === Per-Fixture Errors ===
    #[error("Failed to parse fixture: {0}")]
    FixtureParse(String),

    #[error("Failed to store hierarchy: {0}")]
    StoreFailure(String),

    #[error("Failed to fetch hierarchy: {0}")]
    FetchFailure(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Cannot listen on '{addr}': {error}")]
    Bind { addr: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a fixture naming error for a file whose stem cannot order the run
    pub fn fixture_naming(file: &str, reason: &str) -> Self {
        Self::FixtureNaming {
            file: file.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a bind error for a listener that could not be started
    pub fn bind(addr: &str, error: impl std::fmt::Display) -> Self {
        Self::Bind {
            addr: addr.to_string(),
            error: error.to_string(),
        }
    }

    /// Stable code for the error kind, used in reports
    pub fn code(&self) -> &'static str {
        match self {
            Error::FixtureNaming { .. } => "FIXTURE_NAMING",
            Error::FixtureDir { .. } => "FIXTURE_DIR",
            Error::FixtureParse(_) => "FIXTURE_PARSE",
            Error::StoreFailure(_) => "STORE_FAILURE",
            Error::FetchFailure(_) => "FETCH_FAILURE",
            Error::Config(_) | Error::ConfigParse(_) => "CONFIG",
            Error::FileRead { .. } => "IO",
            Error::Bind { .. } => "BIND",
            Error::Json(_) => "JSON",
        }
    }

    /// Whether this error aborts the whole run rather than a single fixture
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::FixtureNaming { .. } | Error::FixtureDir { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_per_kind() {
        let store = Error::StoreFailure("connection refused".into());
        let fetch = Error::FetchFailure("404 Not Found".into());
        let parse = Error::FixtureParse("missing id".into());
        assert_eq!(store.code(), "STORE_FAILURE");
        assert_eq!(fetch.code(), "FETCH_FAILURE");
        assert_eq!(parse.code(), "FIXTURE_PARSE");
        assert_eq!(Error::bind("127.0.0.1:1", "in use").code(), "BIND");
    }

    #[test]
    fn test_only_discovery_errors_are_fatal() {
        assert!(Error::fixture_naming("abc.json", "not an integer").is_fatal());
        assert!(!Error::StoreFailure("x".into()).is_fatal());
        assert!(!Error::FixtureParse("x".into()).is_fatal());
    }

    #[test]
    fn test_message_embeds_cause() {
        let e = Error::StoreFailure("HTTP 500 Internal Server Error".into());
        assert_eq!(
            e.to_string(),
            "Failed to store hierarchy: HTTP 500 Internal Server Error"
        );
    }
}
