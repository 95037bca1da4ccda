//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inventory used when neither the flag, the environment nor the config file names one
pub const DEFAULT_INVENTORY: &str = "inventory.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default resource inventory path
    pub inventory: Option<PathBuf>,
    /// Default directory holding utilization.json
    pub metrics_dir: Option<PathBuf>,
}

impl Config {
    /// Load `~/.config/cca/config.json`; a missing file yields the defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse config file")
    }

    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("cca").join("config.json"))
    }

    /// Explicit path first, then the configured default
    pub fn inventory_path(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.inventory.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INVENTORY))
    }

    pub fn utilization_path(&self, explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit.or_else(|| {
            self.metrics_dir
                .as_ref()
                .map(|dir| dir.join("utilization.json"))
        })
    }
}
