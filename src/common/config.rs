//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::{config_path, DEFAULT_FIXTURES_DIR};
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Remote storage service location
    #[serde(default)]
    pub service: ServiceConfig,

    /// Fixture discovery settings
    #[serde(default)]
    pub fixtures: FixturesConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Location of the storage service under test
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Target hostname
    #[serde(default = "default_host")]
    pub host: String,

    /// Target port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path segment for both store and fetch
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            endpoint: default_endpoint(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_endpoint() -> String {
    "hierarchy".to_string()
}

impl ServiceConfig {
    /// Base URL of the service, without the endpoint segment
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Reject values that cannot address a service
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("service host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(Error::Config("service port must not be 0".to_string()));
        }
        if self.endpoint.trim_matches('/').is_empty() {
            return Err(Error::Config(
                "service endpoint must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fixture discovery settings
#[derive(Debug, Deserialize, Clone)]
pub struct FixturesConfig {
    /// Directory holding `<n>.json` fixtures
    #[serde(default = "default_fixtures_dir")]
    pub dir: PathBuf,
}

impl Default for FixturesConfig {
    fn default() -> Self {
        Self {
            dir: default_fixtures_dir(),
        }
    }
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from(DEFAULT_FIXTURES_DIR)
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Timeouts {
    /// Per-request timeout; 0 leaves the transport default in place
    #[serde(default)]
    pub request_secs: u64,
}

impl Timeouts {
    /// Per-request timeout, if one is configured
    pub fn request(&self) -> Option<Duration> {
        (self.request_secs > 0).then(|| Duration::from_secs(self.request_secs))
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}
