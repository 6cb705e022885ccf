//! Runtime configuration
//!
//! No CLI flags: a JSON config file under the OS config directory names the
//! spreadsheet coordinates, and `FINTRACK_*` environment variables override
//! individual fields.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub credentials_file: PathBuf,
    pub spreadsheet_id: String,
    pub sheet_range: String,
    pub bind_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::new(),
            spreadsheet_id: String::new(),
            sheet_range: String::new(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    ///
    /// File location: `$FINTRACK_CONFIG`, else
    /// `<os config dir>/fintrack/config.json`.
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os("FINTRACK_CONFIG") {
            Some(p) => PathBuf::from(p),
            None => dirs::config_dir()
                .context("No config directory available on this platform")?
                .join("fintrack")
                .join("config.json"),
        };

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            log::debug!("No config file at {}, using environment only", path.display());
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("FINTRACK_CREDENTIALS_FILE") {
            self.credentials_file = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("FINTRACK_SPREADSHEET_ID") {
            self.spreadsheet_id = v;
        }
        if let Ok(v) = std::env::var("FINTRACK_SHEET_RANGE") {
            self.sheet_range = v;
        }
        if let Ok(v) = std::env::var("FINTRACK_BIND_ADDRESS") {
            self.bind_address = v;
        }
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.credentials_file.as_os_str().is_empty(),
            "credentials_file is not configured"
        );
        anyhow::ensure!(
            !self.spreadsheet_id.is_empty(),
            "spreadsheet_id is not configured"
        );
        anyhow::ensure!(!self.sheet_range.is_empty(), "sheet_range is not configured");
        Ok(())
    }
}
