//! Configuration loading for txmatch.
//!
//! A missing config file means defaults. Command-line overrides win over the file.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use txmatch_types::{ConfigFile, MatchPolicy};

pub const CONFIG_FILE_NAME: &str = "txmatch.toml";
pub const DEFAULT_DB_FILE: &str = "txmatch.db";

/// Settings after merging the config file with command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub policy: MatchPolicy,
    pub pretty: bool,
    /// The config file these settings came from, if any.
    pub source: Option<PathBuf>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub pretty: bool,
}

pub fn parse_config(text: &str) -> Result<ConfigFile, toml::de::Error> {
    toml::from_str(text)
}

pub fn load_config_file(path: &Path) -> anyhow::Result<ConfigFile> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&text).with_context(|| format!("parse config {}", path.display()))
}

/// `txmatch.toml` in `dir`, if present.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Resolve settings relative to `cwd`.
///
/// An explicit `--config` must exist; otherwise `txmatch.toml` in `cwd` is used
/// when present. A relative `store.path` is taken relative to the config file's
/// directory; a relative `--db` relative to `cwd`.
pub fn resolve(cwd: &Path, overrides: &Overrides) -> anyhow::Result<Settings> {
    let source = match &overrides.config {
        Some(path) => Some(cwd.join(path)),
        None => discover(cwd),
    };

    let file = match &source {
        Some(path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    let config_dir = source
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(cwd)
        .to_path_buf();

    let db_path = match (&overrides.db, &file.store.path) {
        (Some(db), _) => cwd.join(db),
        (None, Some(path)) => config_dir.join(path),
        (None, None) => config_dir.join(DEFAULT_DB_FILE),
    };

    Ok(Settings {
        db_path,
        policy: file.matching,
        pretty: overrides.pretty || file.output.pretty.unwrap_or(false),
        source,
    })
}
