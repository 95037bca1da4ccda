//! Cloud Advisor CLI
//!
//! Classify workloads, compare provider costs, and produce placement
//! recommendations and migration plans from a local inventory export.

mod commands;
mod config;
mod output;

use advisor_lib::{pricing::CostPeriod, Provider};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cloud Advisor CLI
#[derive(Parser)]
#[command(name = "cca")]
#[command(
    author,
    version,
    about = "CLI for the Cloud Advisor multi-cloud optimization engine",
    long_about = None
)]
pub struct Cli {
    /// Resource inventory JSON (falls back to ~/.config/cca/config.json, then ./inventory.json)
    #[arg(long, short, env = "CCA_INVENTORY", global = true)]
    pub inventory: Option<PathBuf>,

    /// Output format
    #[arg(long, short, env = "CCA_FORMAT", default_value = "table", global = true)]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every resource into workload archetypes
    Classify {
        /// Only show resources of this provider (aws, azure, gcp)
        #[arg(long, short)]
        provider: Option<Provider>,
    },

    /// Estimate a resource's cost at every provider
    Estimate {
        /// Resource identifier from the inventory
        resource_id: String,

        /// Billing period (hourly, daily, monthly, yearly)
        #[arg(long, default_value = "monthly")]
        period: CostPeriod,
    },

    /// Recommend a provider for every resource and summarize the strategy
    Recommend {
        /// Only list resources that should move
        #[arg(long)]
        moves_only: bool,
    },

    /// Generate a migration plan for one resource
    Plan {
        /// Resource identifier from the inventory
        resource_id: String,
    },

    /// Find idle instances and unattached volumes in a utilization export
    Opportunities {
        /// Provider-keyed utilization JSON (defaults to utilization.json in the configured metrics dir)
        #[arg(long, short)]
        utilization: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load()?;
    let inventory = config.inventory_path(cli.inventory);

    match cli.command {
        Commands::Classify { provider } => {
            commands::classify::run(&inventory, provider, cli.format).await?;
        }
        Commands::Estimate {
            resource_id,
            period,
        } => {
            commands::estimate::run(&inventory, &resource_id, period, cli.format).await?;
        }
        Commands::Recommend { moves_only } => {
            commands::recommend::run(&inventory, moves_only, cli.format).await?;
        }
        Commands::Plan { resource_id } => {
            commands::plan::run(&inventory, &resource_id, cli.format).await?;
        }
        Commands::Opportunities { utilization } => {
            let path = config
                .utilization_path(utilization)
                .context("No utilization file given and no metrics_dir configured")?;
            commands::opportunities::run(&path, cli.format).await?;
        }
    }

    Ok(())
}
