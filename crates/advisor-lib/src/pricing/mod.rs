//! Pricing analysis across providers
//!
//! Holds a staleness-tolerant price cache fed by a [`PricingSource`], maps
//! resource types to their cross-provider equivalents, and produces
//! period-normalised cost estimates. Missing prices degrade to a zero cost
//! so callers always get a complete, comparable estimate.

mod cache;
mod equivalence;
mod source;

pub use cache::{PricingCache, DEFAULT_REFRESH_HOURS};
pub use equivalence::{
    default_instance_type, default_region, equivalent_instance_types, equivalent_region,
    EquivalentTypes,
};
pub use source::{
    builtin_price_list, reference_price, PriceList, PricingSource, StaticPricingSource, UnitPrice,
};

use crate::error::AdvisorError;
use crate::health::{components, HealthRegistry};
use crate::models::{round_cents, Provider, Resource};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Billing period a cost is normalised to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostPeriod {
    Hourly,
    Daily,
    #[default]
    Monthly,
    Yearly,
}

impl CostPeriod {
    /// Hours in the period; months use the 730h average, not calendar months
    pub fn hours(&self) -> f64 {
        match self {
            CostPeriod::Hourly => 1.0,
            CostPeriod::Daily => 24.0,
            CostPeriod::Monthly => 730.0,
            CostPeriod::Yearly => 8760.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CostPeriod::Hourly => "hourly",
            CostPeriod::Daily => "daily",
            CostPeriod::Monthly => "monthly",
            CostPeriod::Yearly => "yearly",
        }
    }
}

impl fmt::Display for CostPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostPeriod {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hourly" => Ok(CostPeriod::Hourly),
            "daily" => Ok(CostPeriod::Daily),
            "monthly" => Ok(CostPeriod::Monthly),
            "yearly" => Ok(CostPeriod::Yearly),
            _ => Err(AdvisorError::InvalidPeriod(s.to_string())),
        }
    }
}

/// Cost of a resource (or its equivalent) at one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCost {
    pub resource_type: String,
    pub region: String,
    pub cost: f64,
}

/// Period cost of a resource at its current provider and the equivalents elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub resource_id: String,
    pub period: CostPeriod,
    pub current_provider: Provider,
    /// Every provider, the current one included
    pub costs: BTreeMap<Provider, ProviderCost>,
}

impl CostEstimate {
    pub fn cost_for(&self, provider: Provider) -> f64 {
        self.costs.get(&provider).map(|c| c.cost).unwrap_or(0.0)
    }

    pub fn current_cost(&self) -> f64 {
        self.cost_for(self.current_provider)
    }

    pub fn alternatives(&self) -> impl Iterator<Item = (&Provider, &ProviderCost)> {
        self.costs
            .iter()
            .filter(move |(p, _)| **p != self.current_provider)
    }
}

/// Cost estimation over a shared price cache
pub struct PricingAnalyzer {
    source: Arc<dyn PricingSource>,
    cache: RwLock<PricingCache>,
    health: Option<HealthRegistry>,
}

impl PricingAnalyzer {
    pub fn new(source: Arc<dyn PricingSource>) -> Self {
        Self::with_refresh_interval(source, Duration::hours(DEFAULT_REFRESH_HOURS))
    }

    pub fn with_refresh_interval(source: Arc<dyn PricingSource>, interval: Duration) -> Self {
        Self {
            source,
            cache: RwLock::new(PricingCache::new(interval)),
            health: None,
        }
    }

    /// Report refresh outcomes on the pricing health component
    pub fn with_health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    /// Refresh every provider whose cached list is stale
    ///
    /// Fetch failures leave the previous (possibly empty) list in place; the
    /// estimate for that provider then degrades to zero-cost entries.
    pub async fn refresh(&self, now: DateTime<Utc>) {
        let mut attempted = false;
        let mut failed = Vec::new();

        for provider in Provider::ALL {
            if self.cache.read().await.is_fresh(provider, now) {
                continue;
            }
            attempted = true;

            match self.source.fetch_prices(provider).await {
                Ok(prices) => {
                    info!(
                        provider = %provider,
                        entries = prices.len(),
                        "Refreshed provider price list"
                    );
                    self.cache.write().await.store(provider, prices, now);
                }
                Err(e) if e.is_not_configured() => {
                    debug!(
                        provider = %provider,
                        "Skipping price refresh for unconfigured provider"
                    );
                }
                Err(e) => {
                    warn!(
                        provider = %provider,
                        error = %e,
                        "Price refresh failed, keeping cached prices"
                    );
                    failed.push(provider.to_string());
                }
            }
        }

        if let (true, Some(health)) = (attempted, &self.health) {
            if failed.is_empty() {
                health.set_healthy(components::PRICING).await;
            } else {
                health
                    .set_degraded(
                        components::PRICING,
                        format!("price refresh failed for {}", failed.join(", ")),
                    )
                    .await;
            }
        }
    }

    /// Snapshot of the current cache contents
    pub async fn cache_snapshot(&self) -> PricingCache {
        self.cache.read().await.clone()
    }

    pub async fn estimate_cost(&self, resource: &Resource, period: CostPeriod) -> CostEstimate {
        self.estimate_cost_at(resource, period, Utc::now()).await
    }

    pub async fn estimate_cost_at(
        &self,
        resource: &Resource,
        period: CostPeriod,
        now: DateTime<Utc>,
    ) -> CostEstimate {
        self.refresh(now).await;
        let cache = self.cache.read().await;
        estimate_from_cache(&cache, resource, period)
    }
}

/// Pure cost estimate over an already-populated cache
pub fn estimate_from_cache(
    cache: &PricingCache,
    resource: &Resource,
    period: CostPeriod,
) -> CostEstimate {
    let hours = period.hours();
    let source = resource.provider;
    let region = resource
        .region
        .clone()
        .unwrap_or_else(|| default_region(source).to_string());
    let equivalents = equivalent_instance_types(&resource.resource_type, source);

    let costs = Provider::ALL
        .iter()
        .map(|provider| {
            let ty = equivalents.get(*provider).to_string();
            let target_region = equivalent_region(&region, source, *provider);
            let cost = cache
                .hourly_price(*provider, &target_region, &ty)
                .map(|price| round_cents(price * hours))
                .unwrap_or(0.0);
            (
                *provider,
                ProviderCost {
                    resource_type: ty,
                    region: target_region,
                    cost,
                },
            )
        })
        .collect();

    CostEstimate {
        resource_id: resource.id.clone(),
        period,
        current_provider: source,
        costs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::ResourceKind;
    use async_trait::async_trait;
    use crate::health::ComponentStatus;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct CountingSource {
        inner: StaticPricingSource,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PricingSource for CountingSource {
        async fn fetch_prices(&self, provider: Provider) -> Result<PriceList> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_prices(provider).await
        }
    }

    /// Fails Azure fetches until `recovered` is set
    struct FlakySource {
        recovered: AtomicBool,
    }

    #[async_trait]
    impl PricingSource for FlakySource {
        async fn fetch_prices(&self, provider: Provider) -> Result<PriceList> {
            if provider == Provider::Azure && !self.recovered.load(Ordering::SeqCst) {
                return Err(AdvisorError::Pricing("rate limited".to_string()));
            }
            StaticPricingSource::new().fetch_prices(provider).await
        }
    }

    fn m5_large() -> Resource {
        Resource::new("i-0abc", "m5.large", ResourceKind::Instance, Provider::Aws)
            .with_region("us-east-1")
    }

    #[test]
    fn test_period_hours() {
        assert_eq!(CostPeriod::Monthly.hours(), 730.0);
        assert_eq!(CostPeriod::Yearly.hours(), 8760.0);
        assert_eq!("Daily".parse::<CostPeriod>().unwrap(), CostPeriod::Daily);
        assert!(matches!(
            "weekly".parse::<CostPeriod>(),
            Err(AdvisorError::InvalidPeriod(_))
        ));
    }

    #[tokio::test]
    async fn test_estimate_covers_all_providers() {
        let analyzer = PricingAnalyzer::new(Arc::new(StaticPricingSource::new()));
        let estimate = analyzer.estimate_cost(&m5_large(), CostPeriod::Monthly).await;

        assert_eq!(estimate.costs.len(), 3);
        assert_eq!(estimate.current_cost(), 70.08);
        assert_eq!(estimate.costs[&Provider::Azure].resource_type, "Standard_D2s_v3");
        assert_eq!(estimate.costs[&Provider::Azure].region, "eastus");
        assert_eq!(estimate.costs[&Provider::Gcp].region, "us-east1");
        assert_eq!(estimate.alternatives().count(), 2);
    }

    #[tokio::test]
    async fn test_estimate_is_rounded_to_cents() {
        let analyzer = PricingAnalyzer::new(Arc::new(StaticPricingSource::new()));
        let estimate = analyzer.estimate_cost(&m5_large(), CostPeriod::Yearly).await;

        for cost in estimate.costs.values() {
            let cents = cost.cost * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6, "{} not rounded", cost.cost);
        }
    }

    #[tokio::test]
    async fn test_missing_price_degrades_to_zero() {
        let source =
            StaticPricingSource::empty().with_price(Provider::Aws, "us-east-1", "m5.large", 0.1);
        let analyzer = PricingAnalyzer::new(Arc::new(source));
        let estimate = analyzer.estimate_cost(&m5_large(), CostPeriod::Hourly).await;

        assert_eq!(estimate.current_cost(), 0.1);
        assert_eq!(estimate.cost_for(Provider::Azure), 0.0);
        assert_eq!(estimate.cost_for(Provider::Gcp), 0.0);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_yields_zero_cost() {
        let source = StaticPricingSource::new().without_provider(Provider::Gcp);
        let analyzer = PricingAnalyzer::new(Arc::new(source));
        let estimate = analyzer.estimate_cost(&m5_large(), CostPeriod::Monthly).await;

        assert!(estimate.current_cost() > 0.0);
        assert_eq!(estimate.cost_for(Provider::Gcp), 0.0);
    }

    #[tokio::test]
    async fn test_refresh_skipped_while_fresh() {
        let source = Arc::new(CountingSource {
            inner: StaticPricingSource::new(),
            calls: AtomicUsize::new(0),
        });
        let analyzer = PricingAnalyzer::new(source.clone());
        let now = Utc::now();

        analyzer.refresh(now).await;
        analyzer.refresh(now + Duration::hours(1)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);

        analyzer.refresh(now + Duration::hours(25)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_refresh_failures_degrade_pricing_health() {
        let health = HealthRegistry::new();
        health.register(components::PRICING).await;
        let source = Arc::new(FlakySource {
            recovered: AtomicBool::new(false),
        });
        let analyzer = PricingAnalyzer::new(source.clone()).with_health(health.clone());
        let now = Utc::now();

        analyzer.refresh(now).await;
        let report = health.health().await;
        assert_eq!(report.components[components::PRICING].status, ComponentStatus::Degraded);

        // only the failed provider is still stale
        source.recovered.store(true, Ordering::SeqCst);
        analyzer.refresh(now).await;
        let report = health.health().await;
        assert_eq!(report.components[components::PRICING].status, ComponentStatus::Healthy);
    }
}
