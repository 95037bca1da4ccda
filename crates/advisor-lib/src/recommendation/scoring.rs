//! Weighted multi-criteria provider scoring

use crate::models::{Archetype, Provider, WorkloadClassification};
use crate::pricing::CostEstimate;
use std::collections::BTreeMap;

/// Factor weights; must sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorWeights {
    pub cost: f64,
    pub performance: f64,
    pub reliability: f64,
    pub data_transfer: f64,
    pub lock_in: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            cost: 0.40,
            performance: 0.30,
            reliability: 0.20,
            data_transfer: 0.05,
            lock_in: 0.05,
        }
    }
}

impl FactorWeights {
    pub fn total(&self) -> f64 {
        self.cost + self.performance + self.reliability + self.data_transfer + self.lock_in
    }
}

/// Per-provider constants driving the composite score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringModel {
    pub weights: FactorWeights,
    /// Provider strength per workload archetype, 0-1
    pub strengths: BTreeMap<Provider, BTreeMap<Archetype, f64>>,
    /// Performance score for archetypes absent from `strengths`
    pub default_strength: f64,
    pub reliability: BTreeMap<Provider, f64>,
    pub data_transfer: f64,
    /// Data-transfer score of the provider already holding the data
    pub data_transfer_home: f64,
    /// Higher is more portable
    pub lock_in: BTreeMap<Provider, f64>,
    /// Minimum composite lead required to recommend a move
    pub significance_threshold: f64,
}

impl Default for ScoringModel {
    fn default() -> Self {
        use Archetype::*;

        let table = |values: [f64; 6]| -> BTreeMap<Archetype, f64> {
            [
                ComputeIntensive,
                StorageIntensive,
                MemoryIntensive,
                Batch,
                RealTime,
                Database,
            ]
            .into_iter()
            .zip(values)
            .collect()
        };

        let strengths = BTreeMap::from([
            (Provider::Aws, table([0.8, 0.7, 0.6, 0.8, 0.9, 0.8])),
            (Provider::Azure, table([0.7, 0.8, 0.7, 0.7, 0.8, 0.9])),
            (Provider::Gcp, table([0.9, 0.6, 0.8, 0.9, 0.7, 0.7])),
        ]);

        Self {
            weights: FactorWeights::default(),
            strengths,
            default_strength: 0.6,
            reliability: BTreeMap::from([
                (Provider::Aws, 0.85),
                (Provider::Azure, 0.82),
                (Provider::Gcp, 0.83),
            ]),
            data_transfer: 0.7,
            data_transfer_home: 0.8,
            lock_in: BTreeMap::from([
                (Provider::Aws, 0.7),
                (Provider::Azure, 0.75),
                (Provider::Gcp, 0.8),
            ]),
            significance_threshold: 0.1,
        }
    }
}

/// Five factor scores for one provider
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FactorScores {
    pub cost: f64,
    pub performance: f64,
    pub reliability: f64,
    pub data_transfer: f64,
    pub lock_in: f64,
}

impl FactorScores {
    pub fn composite(&self, weights: &FactorWeights) -> f64 {
        self.cost * weights.cost
            + self.performance * weights.performance
            + self.reliability * weights.reliability
            + self.data_transfer * weights.data_transfer
            + self.lock_in * weights.lock_in
    }
}

/// Factor and composite scores of every provider for one resource
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderScoreSet {
    pub factors: BTreeMap<Provider, FactorScores>,
    pub composite: BTreeMap<Provider, f64>,
}

impl ProviderScoreSet {
    pub fn composite_for(&self, provider: Provider) -> f64 {
        self.composite.get(&provider).copied().unwrap_or(0.0)
    }

    pub fn factors_for(&self, provider: Provider) -> FactorScores {
        self.factors.get(&provider).copied().unwrap_or_default()
    }

    /// Highest composite score; ties go to the earliest provider in canonical order
    pub fn best(&self) -> Provider {
        let mut best = Provider::ALL[0];
        for provider in Provider::ALL.iter().skip(1) {
            if self.composite_for(*provider) > self.composite_for(best) {
                best = *provider;
            }
        }
        best
    }
}

/// Cheaper-is-better cost factor, current provider pinned at ratio 1.0
///
/// `factor = min(current / candidate, 2) / 2`. A candidate without a
/// price is scored like the current provider.
pub fn cost_factor(current_cost: f64, candidate_cost: f64) -> f64 {
    let ratio = if candidate_cost <= 0.0 {
        1.0
    } else {
        current_cost / candidate_cost
    };
    ratio.min(2.0) / 2.0
}

impl ScoringModel {
    fn strength(&self, provider: Provider, archetype: Archetype) -> f64 {
        self.strengths
            .get(&provider)
            .and_then(|table| table.get(&archetype))
            .copied()
            .unwrap_or(self.default_strength)
    }

    /// Score every provider for one classified resource
    ///
    /// Providers without a price for the resource keep their factor scores
    /// but get no composite, so they can never win unless the current cost
    /// is unknown too.
    pub fn score(
        &self,
        workload: &WorkloadClassification,
        estimate: &CostEstimate,
    ) -> ProviderScoreSet {
        let current = estimate.current_provider;
        let current_cost = estimate.current_cost();

        let factors: BTreeMap<Provider, FactorScores> = Provider::ALL
            .iter()
            .map(|provider| {
                let cost = if *provider == current {
                    cost_factor(1.0, 1.0)
                } else {
                    cost_factor(current_cost, estimate.cost_for(*provider))
                };
                let data_transfer = if *provider == current {
                    self.data_transfer_home
                } else {
                    self.data_transfer
                };

                let scores = FactorScores {
                    cost,
                    performance: self.strength(*provider, workload.primary_type),
                    reliability: self.reliability.get(provider).copied().unwrap_or(0.0),
                    data_transfer,
                    lock_in: self.lock_in.get(provider).copied().unwrap_or(0.0),
                };
                (*provider, scores)
            })
            .collect();

        let composite = factors
            .iter()
            .filter(|(p, _)| {
                **p == current || current_cost <= 0.0 || estimate.cost_for(**p) > 0.0
            })
            .map(|(p, f)| (*p, f.composite(&self.weights)))
            .collect();

        ProviderScoreSet { factors, composite }
    }
}
