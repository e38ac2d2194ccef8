//! Configuration handling for craftcost
//!
//! Configuration is stored in `~/.config/craftcost/config.toml` (global).
//! Every field has a default, so a missing file just means defaults; CLI
//! flags override whatever was loaded.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the recipe catalog database.
    pub database: Option<PathBuf>,

    /// Base URL of the trading post API. Must end in a slash.
    pub api_base_url: String,

    /// Timeout for each market request, in seconds.
    pub request_timeout_secs: u64,

    /// Upper bound for the per-item pricing pool.
    pub max_workers: usize,

    /// Size of the outer pool used for watchlist evaluation.
    pub batch_workers: usize,

    /// Minimum ROI percentage (exclusive) for a report row.
    pub roi_threshold: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            api_base_url: crate::market::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
            max_workers: 8,
            batch_workers: 15,
            roi_threshold: 40,
        }
    }
}

impl Config {
    /// Loads the global config file, falling back to defaults when absent.
    pub fn load_global() -> Result<Self> {
        match Self::global_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads a config file from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Location of the global config file, if a home directory exists.
    pub fn global_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "craftcost")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();

        assert_eq!(config.database, None);
        assert_eq!(config.api_base_url, crate::market::DEFAULT_BASE_URL);
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.batch_workers, 15);
        assert_eq!(config.roi_threshold, 40);
    }

    #[test]
    fn partial_file_fills_missing_fields_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database = \"/tmp/catalog.db\"").unwrap();
        writeln!(file, "roi_threshold = 25").unwrap();

        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.database, Some(PathBuf::from("/tmp/catalog.db")));
        assert_eq!(config.roi_threshold, 25);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_workers = \"lots\"").unwrap();

        assert!(Config::load_from(file.path()).is_err());
    }
}
