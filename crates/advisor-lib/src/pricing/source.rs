//! Pricing source collaborator and the built-in catalogue

use crate::error::{AdvisorError, Result};
use crate::models::Provider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Hourly prices for one resource type in one region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPrice {
    /// On-demand / pay-as-you-go
    pub on_demand: f64,
    /// One-year reserved or committed-use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_year: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_year: Option<f64>,
}

/// Price list for a single provider: region -> resource type -> price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceList {
    regions: BTreeMap<String, BTreeMap<String, UnitPrice>>,
}

impl PriceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, region: &str, resource_type: &str, price: UnitPrice) {
        self.regions
            .entry(region.to_string())
            .or_default()
            .insert(resource_type.to_string(), price);
    }

    pub fn get(&self, region: &str, resource_type: &str) -> Option<&UnitPrice> {
        self.regions.get(region)?.get(resource_type)
    }

    pub fn len(&self) -> usize {
        self.regions.values().map(|types| types.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of provider price lists
///
/// A provider without credentials yields `AdvisorError::ProviderNotConfigured`.
#[async_trait]
pub trait PricingSource: Send + Sync {
    async fn fetch_prices(&self, provider: Provider) -> Result<PriceList>;
}

/// (type, on-demand, 1y, 3y) in the provider's reference region
type CatalogueRow = (&'static str, f64, f64, f64);

const AWS_CATALOGUE: &[CatalogueRow] = &[
    ("t2.micro", 0.0116, 0.0073, 0.0050),
    ("t2.small", 0.023, 0.0145, 0.0099),
    ("t2.medium", 0.0464, 0.0292, 0.0200),
    ("m5.large", 0.096, 0.0605, 0.0413),
    ("m5.xlarge", 0.192, 0.121, 0.0826),
    ("c5.large", 0.085, 0.0536, 0.0366),
    ("c5.xlarge", 0.17, 0.1071, 0.0731),
    ("r5.large", 0.126, 0.0794, 0.0542),
];

const AZURE_CATALOGUE: &[CatalogueRow] = &[
    ("Standard_B1s", 0.0104, 0.0062, 0.0040),
    ("Standard_B1ms", 0.0207, 0.0124, 0.0080),
    ("Standard_B2s", 0.0416, 0.0250, 0.0160),
    ("Standard_D2s_v3", 0.096, 0.0568, 0.0368),
    ("Standard_D4s_v3", 0.192, 0.1136, 0.0736),
    ("Standard_F2s_v2", 0.0846, 0.0504, 0.0326),
    ("Standard_E2s_v3", 0.126, 0.0748, 0.0484),
];

const GCP_CATALOGUE: &[CatalogueRow] = &[
    ("e2-micro", 0.0084, 0.0053, 0.0038),
    ("e2-small", 0.0168, 0.0106, 0.0076),
    ("e2-medium", 0.0335, 0.0211, 0.0151),
    ("n1-standard-1", 0.0475, 0.0308, 0.0210),
    ("n1-standard-2", 0.0950, 0.0617, 0.0420),
    ("n2-standard-2", 0.0971, 0.0612, 0.0437),
    ("n2-standard-4", 0.1942, 0.1224, 0.0874),
    ("c2-standard-4", 0.2088, 0.1316, 0.0940),
    ("m2-ultramem-2", 0.1489, 0.0938, 0.0670),
];

/// (region, multiplier over the reference region)
const AWS_REGIONS: &[(&str, f64)] = &[
    ("us-east-1", 1.0),
    ("us-east-2", 1.0),
    ("us-west-2", 1.0),
    ("eu-west-1", 1.1),
];

const AZURE_REGIONS: &[(&str, f64)] = &[
    ("eastus", 1.0),
    ("centralus", 1.0),
    ("westus2", 1.0),
    ("westeurope", 1.1),
];

const GCP_REGIONS: &[(&str, f64)] = &[
    ("us-central1", 1.0),
    ("us-east1", 1.0),
    ("us-west1", 1.0),
    ("europe-west1", 1.1),
];

fn round_price(price: f64) -> f64 {
    (price * 10_000.0).round() / 10_000.0
}

fn build_price_list(catalogue: &[CatalogueRow], regions: &[(&str, f64)]) -> PriceList {
    let mut list = PriceList::new();
    for (region, multiplier) in regions {
        for (ty, on_demand, one_year, three_year) in catalogue {
            list.insert(
                region,
                ty,
                UnitPrice {
                    on_demand: round_price(on_demand * multiplier),
                    one_year: Some(round_price(one_year * multiplier)),
                    three_year: Some(round_price(three_year * multiplier)),
                },
            );
        }
    }
    list
}

fn catalogue(provider: Provider) -> &'static [CatalogueRow] {
    match provider {
        Provider::Aws => AWS_CATALOGUE,
        Provider::Azure => AZURE_CATALOGUE,
        Provider::Gcp => GCP_CATALOGUE,
    }
}

/// On-demand hourly price of an instance type in its provider's reference region
pub fn reference_price(provider: Provider, instance_type: &str) -> Option<f64> {
    catalogue(provider)
        .iter()
        .find(|(ty, ..)| *ty == instance_type)
        .map(|(_, on_demand, ..)| *on_demand)
}

/// Built-in catalogue of common instance families for all three providers
pub fn builtin_price_list(provider: Provider) -> PriceList {
    let regions = match provider {
        Provider::Aws => AWS_REGIONS,
        Provider::Azure => AZURE_REGIONS,
        Provider::Gcp => GCP_REGIONS,
    };
    build_price_list(catalogue(provider), regions)
}

/// In-process pricing source backed by fixed price lists
#[derive(Debug, Clone)]
pub struct StaticPricingSource {
    lists: BTreeMap<Provider, PriceList>,
    disabled: BTreeSet<Provider>,
}

impl Default for StaticPricingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticPricingSource {
    /// Source serving the built-in catalogue for every provider
    pub fn new() -> Self {
        let lists = Provider::ALL
            .iter()
            .map(|p| (*p, builtin_price_list(*p)))
            .collect();
        Self {
            lists,
            disabled: BTreeSet::new(),
        }
    }

    /// Source with no prices at all
    pub fn empty() -> Self {
        Self {
            lists: BTreeMap::new(),
            disabled: BTreeSet::new(),
        }
    }

    pub fn with_price(
        mut self,
        provider: Provider,
        region: &str,
        ty: &str,
        on_demand: f64,
    ) -> Self {
        self.lists.entry(provider).or_default().insert(
            region,
            ty,
            UnitPrice {
                on_demand,
                one_year: None,
                three_year: None,
            },
        );
        self
    }

    /// Treat the provider as having no configured credentials
    pub fn without_provider(mut self, provider: Provider) -> Self {
        self.disabled.insert(provider);
        self
    }
}

#[async_trait]
impl PricingSource for StaticPricingSource {
    async fn fetch_prices(&self, provider: Provider) -> Result<PriceList> {
        if self.disabled.contains(&provider) {
            return Err(AdvisorError::ProviderNotConfigured(provider));
        }
        Ok(self.lists.get(&provider).cloned().unwrap_or_default())
    }
}
