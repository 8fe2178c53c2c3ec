//! CLI command handling
//!
//! Resolves configuration, runs the requested command and formats output.

use std::path::Path;

use colored::Colorize;

use crate::client::HierarchyClient;
use crate::commands::{Commands, ServiceArgs};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::fixtures::list_fixtures;
use crate::oracle::first_difference;
use crate::testing::{run_suite, RunOptions};

/// Dispatch a CLI command
///
/// Returns `Ok(false)` when the command ran but its check failed, so the
/// caller can exit non-zero without printing an error.
pub async fn dispatch(command: Commands) -> Result<bool> {
    match command {
        Commands::Run {
            dir,
            service,
            json,
            verbose,
        } => {
            let config = resolve_config(service.config.as_deref(), &service)?;
            let dir = dir.unwrap_or_else(|| config.fixtures.dir.clone());
            let client = HierarchyClient::from_config(&config)?;

            if !json {
                println!(
                    "{} {} against {}/{}",
                    "Running fixtures in".cyan(),
                    dir.display(),
                    config.service.base_url(),
                    config.service.endpoint.trim_matches('/')
                );
            }

            let options = RunOptions {
                progress: !json,
                verbose: verbose && !json,
            };
            let summary = run_suite(&dir, &client, options).await?;

            if json {
                println!("{}", summary.to_json()?);
            } else {
                summary.print();
            }

            Ok(summary.all_passed())
        }

        Commands::List { dir, config } => {
            let config = load_config(config.as_deref())?;
            let dir = dir.unwrap_or(config.fixtures.dir);
            let fixtures = list_fixtures(&dir)?;

            if fixtures.is_empty() {
                println!("No fixtures in {}", dir.display());
            } else {
                println!("Fixtures in {} (execution order):", dir.display());
                for fixture in &fixtures {
                    println!("  {:>6}  {}", fixture.order, fixture.name);
                }
            }

            Ok(true)
        }

        Commands::Compare { expected, actual } => {
            let expected_value = read_json(&expected)?;
            let actual_value = read_json(&actual)?;

            match first_difference(&expected_value, &actual_value) {
                None => {
                    println!("{} equivalent", "✓".green());
                    Ok(true)
                }
                Some(diff) => {
                    println!("{} not equivalent {}", "✗".red(), diff);
                    Ok(false)
                }
            }
        }
    }
}

/// Load the config file given on the command line, or the default one
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Load config and apply command-line overrides on top
pub fn resolve_config(path: Option<&Path>, args: &ServiceArgs) -> Result<Config> {
    let mut config = load_config(path)?;
    apply_overrides(&mut config, args);
    config.service.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &ServiceArgs) {
    if let Some(host) = &args.host {
        config.service.host = host.clone();
    }
    if let Some(port) = args.port {
        config.service.port = port;
    }
    if let Some(endpoint) = &args.endpoint {
        config.service.endpoint = endpoint.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeouts.request_secs = timeout;
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[service]\nhost = \"file-host\"\nport = 9000\n\n[timeouts]\nrequest_secs = 3\n",
        )
        .unwrap();

        let args = ServiceArgs {
            port: Some(7000),
            endpoint: Some("trees".to_string()),
            ..ServiceArgs::default()
        };
        let config = resolve_config(Some(path.as_path()), &args).unwrap();

        assert_eq!(config.service.host, "file-host");
        assert_eq!(config.service.port, 7000);
        assert_eq!(config.service.endpoint, "trees");
        assert_eq!(config.timeouts.request_secs, 3);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let args = ServiceArgs {
            endpoint: Some(String::new()),
            ..ServiceArgs::default()
        };
        assert!(matches!(
            resolve_config(Some(path.as_path()), &args),
            Err(Error::Config(_))
        ));
    }
}
