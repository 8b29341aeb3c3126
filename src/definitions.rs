//! Reader for Bruno-style request-definition files.
//!
//! Each `.bru` file describes one API request. Extraction is best-effort
//! line-pattern matching rather than a full grammar: every field is optional
//! and an unreadable file degrades to an all-empty record instead of failing
//! the run.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, error};

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"name:\s*(.+)").unwrap());
static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"url:\s*(.+)").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"api_key[=:]([^&\s]+)").unwrap());
static SERIES_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"series_id[=:]([^&\s]+)").unwrap());

/// Configuration extracted from one definition file. Unmatched fields stay
/// empty.
#[derive(Debug, Clone, Default)]
pub struct IndicatorDefinition {
    pub name: String,
    pub url: String,
    pub series_id: String,
    pub api_key: String,
}

/// Parse a definition file. Never fails: read errors are logged and yield the
/// default (all-empty) record.
pub fn parse_definition(path: &Path) -> IndicatorDefinition {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!("Error parsing definition file {}: {}", path.display(), e);
            return IndicatorDefinition::default();
        }
    };

    let capture = |re: &Regex| {
        re.captures(&content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    };

    let definition = IndicatorDefinition {
        name: capture(&NAME_RE),
        url: capture(&URL_RE),
        series_id: capture(&SERIES_ID_RE),
        api_key: capture(&API_KEY_RE),
    };
    debug!("Parsed definition {}: {:?}", path.display(), definition);
    definition
}

/// Enumerate the `.bru` files directly under `dir`, non-recursive.
///
/// The order follows the platform's directory enumeration and is not stable
/// across platforms; with auto-discovered API keys this makes the effective
/// key non-deterministic when files disagree.
pub fn list_definitions(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("bru")
        })
        .collect();
    Ok(files)
}
