//! Collaborator interfaces for raw cloud telemetry
//!
//! Resource and metrics acquisition live outside the engine. This module
//! defines the traits the engine consumes, the per-provider orchestration
//! that turns collector failures into "no data this cycle", and file-backed
//! implementations used by the daemon and the CLI.

mod file;

pub use file::{FileMetricsCollector, FileResourceCollector};

use crate::error::{AdvisorError, Result};
use crate::models::{Provider, Resource, ResourceInventory};
use crate::monitor::{CostMetrics, PerformanceMetrics, UtilizationMetrics};
use crate::observability::{AdvisorMetrics, StructuredLogger};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub use async_trait::async_trait;

/// Default bound on a single collector call
pub const DEFAULT_COLLECTOR_TIMEOUT: Duration = Duration::from_secs(30);

/// Resources of one provider grouped by resource group name
pub type ResourceGroups = BTreeMap<String, Vec<Resource>>;

/// Source of resource snapshots
#[async_trait]
pub trait ResourceCollector: Send + Sync {
    /// Providers this collector holds credentials for
    async fn configured_providers(&self) -> Vec<Provider>;

    /// Collect every resource of one provider
    ///
    /// Returns `AdvisorError::ProviderNotConfigured` for providers without
    /// credentials.
    async fn collect_resources(&self, provider: Provider) -> Result<ResourceGroups>;
}

/// Source of cost, performance and utilization telemetry
#[async_trait]
pub trait MetricsCollector: Send + Sync {
    async fn configured_providers(&self) -> Vec<Provider>;

    async fn collect_costs(&self, provider: Provider, range: DateRange) -> Result<CostMetrics>;

    async fn collect_performance(&self, provider: Provider) -> Result<PerformanceMetrics>;

    async fn collect_utilization(&self, provider: Provider) -> Result<UtilizationMetrics>;
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The `days` days ending at `now`
    pub fn last_days(now: DateTime<Utc>, days: i64) -> Self {
        let end = now.date_naive();
        Self {
            start: end - ChronoDuration::days(days),
            end,
        }
    }
}

/// Bound a collector call, mapping expiry to `AdvisorError::Timeout`
pub async fn with_timeout<T, F>(operation: &str, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AdvisorError::Timeout {
            operation: operation.to_string(),
            seconds: limit.as_secs(),
        }),
    }
}

/// Per-provider results of one collection pass
#[derive(Debug)]
pub struct ProviderResults<T> {
    pub data: BTreeMap<Provider, T>,
    /// Providers treated as absent, with the reason
    pub skipped: Vec<(Provider, String)>,
}

impl<T> ProviderResults<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Run one collector call per provider, isolating failures
///
/// Unconfigured providers, provider errors and timeouts are logged and
/// reported in `skipped`; they never abort the pass.
pub async fn collect_per_provider<T, F, Fut>(
    operation: &str,
    limit: Duration,
    logger: &StructuredLogger,
    metrics: Option<&AdvisorMetrics>,
    mut call: F,
) -> ProviderResults<T>
where
    F: FnMut(Provider) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut results = ProviderResults {
        data: BTreeMap::new(),
        skipped: Vec::new(),
    };

    for provider in Provider::ALL {
        let start = Instant::now();
        let outcome = with_timeout(operation, limit, call(provider)).await;
        if let Some(m) = metrics {
            m.observe_collection_latency(start.elapsed().as_secs_f64());
        }

        match outcome {
            Ok(data) => {
                debug!(provider = %provider, operation = %operation, "Collected provider data");
                results.data.insert(provider, data);
            }
            Err(e) if e.is_not_configured() => {
                debug!(provider = %provider, operation = %operation, "Provider not configured");
                results.skipped.push((provider, e.to_string()));
            }
            Err(e) => {
                logger.log_provider_skipped(provider, operation, &e.to_string());
                results.skipped.push((provider, e.to_string()));
            }
        }
    }

    results
}

/// Collect every configured provider's resources into one inventory
pub async fn collect_all_resources(
    collector: &dyn ResourceCollector,
    limit: Duration,
    logger: &StructuredLogger,
    metrics: Option<&AdvisorMetrics>,
) -> ResourceInventory {
    collect_per_provider("collect_resources", limit, logger, metrics, |provider| {
        collector.collect_resources(provider)
    })
    .await
    .data
}
