//! Dashboard configuration
//! Defaults point at `Attachment.xlsx` / `Orders`; an optional `dashboard.json`
//! in the working directory overrides them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

pub const CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub source_path: PathBuf,
    pub sheet_name: String,
    pub histogram_bins: usize,
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("Attachment.xlsx"),
            sheet_name: "Orders".to_string(),
            histogram_bins: 50,
            preview_rows: 10,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read `path` if it exists; fall back to defaults on any problem.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), "{}, using defaults", err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = DashboardConfig::load_or_default(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.sheet_name, "Orders");
    }

    #[test]
    fn partial_file_overrides_given_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "source_path": "data/superstore.xlsx", "histogram_bins": 20 }"#)
            .unwrap();

        let config = DashboardConfig::load_or_default(&path);
        assert_eq!(config.source_path, PathBuf::from("data/superstore.xlsx"));
        assert_eq!(config.histogram_bins, 20);
        assert_eq!(config.sheet_name, "Orders");
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(DashboardConfig::from_file(&path).is_err());
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
    }
}
