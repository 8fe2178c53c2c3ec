//! Fixture discovery and loading
//!
//! A fixture is a `<n>.json` file holding one hierarchy. The integer stem
//! only decides execution order; the document's own `id` is what gets
//! fetched back.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::common::{Error, Result};

/// A discovered fixture file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureEntry {
    /// File name, e.g. `3.json`
    pub name: String,
    /// Integer parsed from the file stem; wider than `i64` so long stems still order
    pub order: i128,
    /// Full path to the file
    pub path: PathBuf,
}

/// A fixture document that passed pre-submission checks
#[derive(Debug, Clone)]
pub struct LoadedFixture {
    /// The hierarchy exactly as read from disk
    pub hierarchy: Value,
    /// Value of the top-level `id` field
    pub root_id: i64,
}

/// List the JSON fixtures in `dir`, ordered by their integer stem
///
/// Fails if any JSON file has a non-integer stem, or if two stems parse to
/// the same integer, since either makes the order ambiguous.
pub fn list_fixtures(dir: &Path) -> Result<Vec<FixtureEntry>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::FixtureDir {
        path: dir.display().to_string(),
        error: e.to_string(),
    })?;

    let mut fixtures = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::FixtureDir {
            path: dir.display().to_string(),
            error: e.to_string(),
        })?;

        let path = entry.path();
        if !path.is_file() || !is_json(&path) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let order = stem.trim().parse::<i128>().map_err(|_| {
            Error::fixture_naming(&name, &format!("stem '{}' is not an integer", stem))
        })?;

        fixtures.push(FixtureEntry { name, order, path });
    }

    fixtures.sort_by_key(|f| f.order);

    if let Some(pair) = fixtures.windows(2).find(|w| w[0].order == w[1].order) {
        return Err(Error::fixture_naming(
            &pair[1].name,
            &format!("order {} is also used by '{}'", pair[1].order, pair[0].name),
        ));
    }

    tracing::debug!(dir = %dir.display(), count = fixtures.len(), "discovered fixtures");
    Ok(fixtures)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Read a fixture and check it has an integer `id` at the top level
pub fn load_fixture(path: &Path) -> Result<LoadedFixture> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::FixtureParse(format!("{}: {}", path.display(), e)))?;
    parse_fixture(&content)
}

/// Parse fixture text; split out from [`load_fixture`] for testing
pub fn parse_fixture(content: &str) -> Result<LoadedFixture> {
    let hierarchy: Value = serde_json::from_str(content)
        .map_err(|e| Error::FixtureParse(format!("invalid JSON: {}", e)))?;

    let object = hierarchy.as_object().ok_or_else(|| {
        Error::FixtureParse("top level must be a JSON object".to_string())
    })?;

    let root_id = match object.get("id") {
        None => return Err(Error::FixtureParse("missing 'id' field".to_string())),
        Some(id) => id.as_i64().ok_or_else(|| {
            Error::FixtureParse(format!("'id' must be an integer, got {}", id))
        })?,
    };

    Ok(LoadedFixture { hierarchy, root_id })
}
