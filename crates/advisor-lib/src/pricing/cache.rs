//! Staleness-tolerant per-provider price cache

use super::source::{PriceList, UnitPrice};
use crate::models::Provider;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Default refresh interval for provider price lists
pub const DEFAULT_REFRESH_HOURS: i64 = 24;

#[derive(Debug, Clone)]
struct CacheEntry {
    prices: PriceList,
    fetched_at: DateTime<Utc>,
}

/// Price lists keyed by provider with a refresh interval
///
/// An entry is fresh while younger than the interval; a stale entry keeps
/// serving lookups until it is replaced.
#[derive(Debug, Clone)]
pub struct PricingCache {
    entries: BTreeMap<Provider, CacheEntry>,
    refresh_interval: Duration,
}

impl Default for PricingCache {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_REFRESH_HOURS))
    }
}

impl PricingCache {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            entries: BTreeMap::new(),
            refresh_interval,
        }
    }

    pub fn is_fresh(&self, provider: Provider, now: DateTime<Utc>) -> bool {
        self.entries
            .get(&provider)
            .map(|entry| now - entry.fetched_at < self.refresh_interval)
            .unwrap_or(false)
    }

    pub fn store(&mut self, provider: Provider, prices: PriceList, now: DateTime<Utc>) {
        self.entries.insert(
            provider,
            CacheEntry {
                prices,
                fetched_at: now,
            },
        );
    }

    pub fn last_updated(&self, provider: Provider) -> Option<DateTime<Utc>> {
        self.entries.get(&provider).map(|entry| entry.fetched_at)
    }

    pub fn unit_price(&self, provider: Provider, region: &str, ty: &str) -> Option<UnitPrice> {
        self.entries
            .get(&provider)
            .and_then(|entry| entry.prices.get(region, ty))
            .copied()
    }

    /// On-demand hourly price
    pub fn hourly_price(&self, provider: Provider, region: &str, ty: &str) -> Option<f64> {
        self.unit_price(provider, region, ty).map(|p| p.on_demand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshness_window() {
        let mut cache = PricingCache::default();
        let t0 = Utc::now();
        assert!(!cache.is_fresh(Provider::Aws, t0));

        cache.store(Provider::Aws, PriceList::new(), t0);
        assert!(cache.is_fresh(Provider::Aws, t0 + Duration::hours(23)));
        assert!(!cache.is_fresh(Provider::Aws, t0 + Duration::hours(24)));
        assert!(!cache.is_fresh(Provider::Gcp, t0));
        assert_eq!(cache.last_updated(Provider::Aws), Some(t0));
    }

    #[test]
    fn test_hourly_price_lookup() {
        let mut prices = PriceList::new();
        prices.insert(
            "eastus",
            "Standard_B1s",
            UnitPrice {
                on_demand: 0.0104,
                one_year: None,
                three_year: None,
            },
        );

        let mut cache = PricingCache::default();
        cache.store(Provider::Azure, prices, Utc::now());
        assert_eq!(cache.hourly_price(Provider::Azure, "eastus", "Standard_B1s"), Some(0.0104));
        assert_eq!(cache.hourly_price(Provider::Azure, "westus2", "Standard_B1s"), None);
    }
}
