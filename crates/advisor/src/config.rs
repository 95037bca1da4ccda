//! Daemon configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an optional config file
pub const CONFIG_FILE_ENV: &str = "ADVISOR_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorConfig {
    /// Port for the health, metrics and REST API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// JSON resource inventory read by the resource collector
    #[serde(default = "default_inventory_path")]
    pub inventory_path: PathBuf,

    /// Directory holding cost.json, performance.json and utilization.json
    #[serde(default = "default_metrics_dir")]
    pub metrics_dir: PathBuf,

    #[serde(default = "default_collector_timeout")]
    pub collector_timeout_secs: u64,

    #[serde(default = "default_pricing_refresh")]
    pub pricing_refresh_hours: i64,

    /// Run every monitor job once at start-up instead of waiting for its slot
    #[serde(default)]
    pub run_startup_collection: bool,
}

fn default_api_port() -> u16 {
    8080
}

fn default_inventory_path() -> PathBuf {
    PathBuf::from("inventory.json")
}

fn default_metrics_dir() -> PathBuf {
    PathBuf::from("metrics")
}

fn default_collector_timeout() -> u64 {
    30
}

fn default_pricing_refresh() -> i64 {
    24
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            inventory_path: default_inventory_path(),
            metrics_dir: default_metrics_dir(),
            collector_timeout_secs: default_collector_timeout(),
            pricing_refresh_hours: default_pricing_refresh(),
            run_startup_collection: false,
        }
    }
}

impl AdvisorConfig {
    /// Load from the optional `ADVISOR_CONFIG` file, then `ADVISOR_*` variables
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(config::File::with_name(&path));
        }

        builder
            .add_source(config::Environment::with_prefix("ADVISOR"))
            .build()
            .context("Failed to read advisor configuration")?
            .try_deserialize()
            .context("Invalid advisor configuration")
    }

    pub fn collector_timeout(&self) -> Duration {
        Duration::from_secs(self.collector_timeout_secs.max(1))
    }

    pub fn pricing_refresh_interval(&self) -> chrono::Duration {
        chrono::Duration::hours(self.pricing_refresh_hours.max(1))
    }
}
