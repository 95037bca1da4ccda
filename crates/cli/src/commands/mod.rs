//! Subcommand implementations
//!
//! Every command works on a local inventory export; nothing talks to a
//! running daemon.

pub mod classify;
pub mod estimate;
pub mod opportunities;
pub mod plan;
pub mod recommend;

use advisor_lib::{
    collector::FileResourceCollector,
    pricing::{PricingAnalyzer, StaticPricingSource},
    recommendation::{RecommendationEngine, RecommendationRun},
    Resource, ResourceInventory,
};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

pub async fn load_inventory(path: &Path) -> Result<ResourceInventory> {
    let inventory = FileResourceCollector::new(path)
        .load()
        .await
        .with_context(|| format!("Failed to load inventory {}", path.display()))?;

    if inventory.is_empty() {
        bail!("Inventory {} contains no providers", path.display());
    }
    Ok(inventory)
}

pub fn find_resource<'a>(inventory: &'a ResourceInventory, id: &str) -> Result<&'a Resource> {
    inventory
        .values()
        .flat_map(|groups| groups.values().flatten())
        .find(|r| r.id == id)
        .with_context(|| format!("Resource '{}' not found in inventory", id))
}

/// Analyzer over the built-in price catalogue, already refreshed
pub async fn pricing() -> Arc<PricingAnalyzer> {
    let analyzer = Arc::new(PricingAnalyzer::new(Arc::new(StaticPricingSource::new())));
    analyzer.refresh(Utc::now()).await;
    analyzer
}

pub async fn recommend_inventory(path: &Path) -> Result<RecommendationRun> {
    let inventory = load_inventory(path).await?;
    let collector = Arc::new(FileResourceCollector::new(path));
    let engine = RecommendationEngine::new(collector, pricing().await);
    Ok(engine.recommend_inventory(inventory).await)
}
