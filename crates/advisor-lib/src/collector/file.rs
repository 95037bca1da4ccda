//! File-backed collectors reading JSON exports

use super::{DateRange, MetricsCollector, ResourceCollector, ResourceGroups};
use crate::error::{AdvisorError, Result};
use crate::models::{Provider, ResourceInventory};
use crate::monitor::{CostMetrics, PerformanceMetrics, UtilizationMetrics};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const COST_FILE: &str = "cost.json";
const PERFORMANCE_FILE: &str = "performance.json";
const UTILIZATION_FILE: &str = "utilization.json";

/// Read a provider-keyed JSON document; a missing file means "nothing configured"
async fn read_provider_map<T: DeserializeOwned>(
    path: &Path,
) -> Result<Option<BTreeMap<Provider, T>>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Provider keys of a readable export; unreadable files contribute none
async fn providers_in(path: &Path) -> Vec<Provider> {
    match read_provider_map::<serde_json::Value>(path).await {
        Ok(Some(map)) => map.into_keys().collect(),
        _ => Vec::new(),
    }
}

async fn take_provider<T: DeserializeOwned>(path: &Path, provider: Provider) -> Result<T> {
    read_provider_map::<T>(path)
        .await?
        .and_then(|mut map| map.remove(&provider))
        .ok_or(AdvisorError::ProviderNotConfigured(provider))
}

/// Resource inventory exported as JSON
///
/// Layout: `{ "<provider>": { "<group>": [Resource, ...] } }`. Providers
/// absent from the document are not configured.
#[derive(Debug, Clone)]
pub struct FileResourceCollector {
    path: PathBuf,
}

impl FileResourceCollector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole inventory in one read
    pub async fn load(&self) -> Result<ResourceInventory> {
        Ok(read_provider_map(&self.path).await?.unwrap_or_default())
    }
}

#[async_trait]
impl ResourceCollector for FileResourceCollector {
    async fn configured_providers(&self) -> Vec<Provider> {
        providers_in(&self.path).await
    }

    async fn collect_resources(&self, provider: Provider) -> Result<ResourceGroups> {
        let groups: ResourceGroups = take_provider(&self.path, provider).await?;

        // A resource filed under one provider must claim that provider
        for resource in groups.values().flatten() {
            if resource.provider != provider {
                return Err(AdvisorError::Collection {
                    provider,
                    message: format!(
                        "resource '{}' is tagged {} but listed under {}",
                        resource.id, resource.provider, provider
                    ),
                });
            }
        }
        Ok(groups)
    }
}

/// Telemetry exported as `cost.json`, `performance.json` and `utilization.json`
///
/// Each file maps provider name to that provider's payload. The cost export
/// is expected to already cover the requested window.
#[derive(Debug, Clone)]
pub struct FileMetricsCollector {
    dir: PathBuf,
}

impl FileMetricsCollector {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl MetricsCollector for FileMetricsCollector {
    async fn configured_providers(&self) -> Vec<Provider> {
        let mut providers = Vec::new();
        for name in [COST_FILE, PERFORMANCE_FILE, UTILIZATION_FILE] {
            providers.extend(providers_in(&self.dir.join(name)).await);
        }
        providers.sort();
        providers.dedup();
        providers
    }

    async fn collect_costs(&self, provider: Provider, _range: DateRange) -> Result<CostMetrics> {
        take_provider(&self.dir.join(COST_FILE), provider).await
    }

    async fn collect_performance(&self, provider: Provider) -> Result<PerformanceMetrics> {
        take_provider(&self.dir.join(PERFORMANCE_FILE), provider).await
    }

    async fn collect_utilization(&self, provider: Provider) -> Result<UtilizationMetrics> {
        take_provider(&self.dir.join(UTILIZATION_FILE), provider).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    const INVENTORY: &str = r#"{
        "aws": {
            "ec2": [
                {"id": "i-1", "resource_type": "m5.large", "provider": "aws", "region": "us-east-1"}
            ]
        },
        "gcp": {
            "instances": [
                {"id": "vm-1", "resource_type": "e2-micro", "provider": "gcp"}
            ]
        }
    }"#;

    #[tokio::test]
    async fn test_file_resource_collector() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.json");
        std::fs::write(&path, INVENTORY).unwrap();

        let collector = FileResourceCollector::new(&path);
        assert_eq!(
            collector.configured_providers().await,
            vec![Provider::Aws, Provider::Gcp]
        );

        let aws = collector.collect_resources(Provider::Aws).await.unwrap();
        assert_eq!(aws["ec2"][0].id, "i-1");

        let err = collector.collect_resources(Provider::Azure).await.unwrap_err();
        assert!(err.is_not_configured());
    }

    #[tokio::test]
    async fn test_mismatched_provider_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.json");
        std::fs::write(
            &path,
            r#"{"azure": {"vms": [{"id": "vm-1", "resource_type": "Standard_B1s", "provider": "aws"}]}}"#,
        )
        .unwrap();

        let err = FileResourceCollector::new(&path)
            .collect_resources(Provider::Azure)
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::Collection { .. }));
    }

    #[tokio::test]
    async fn test_file_metrics_collector() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(COST_FILE),
            r#"{"azure": {"total_cost": 1245.67, "service_breakdown": {"Virtual Machines": 456.78}}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(UTILIZATION_FILE),
            r#"{"aws": {"instances": [{"instance_id": "i-1", "instance_type": "t2.micro", "cpu_utilization": 3.0}]}}"#,
        )
        .unwrap();

        let collector = FileMetricsCollector::new(dir.path());
        assert_eq!(
            collector.configured_providers().await,
            vec![Provider::Aws, Provider::Azure]
        );

        let costs = collector
            .collect_costs(Provider::Azure, DateRange::last_days(Utc::now(), 30))
            .await
            .unwrap();
        assert_eq!(costs.service_breakdown["Virtual Machines"], 456.78);

        let util = collector.collect_utilization(Provider::Aws).await.unwrap();
        assert_eq!(util.instances[0].cpu_utilization, 3.0);

        // No performance export at all
        let err = collector.collect_performance(Provider::Aws).await.unwrap_err();
        assert!(err.is_not_configured());
    }
}
