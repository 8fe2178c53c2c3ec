//! Configuration paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/hierarchy-harness/`
//! - macOS: `~/Library/Application Support/hierarchy-harness/`
//! - Windows: `%APPDATA%\hierarchy-harness\`

use std::path::PathBuf;

/// Application name used for config directories
const APP_NAME: &str = "hierarchy-harness";

/// Fixture directory used when neither config nor flags name one
pub const DEFAULT_FIXTURES_DIR: &str = "tests/objects";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
