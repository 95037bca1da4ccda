//! Per-resource placement recommendations and the aggregate strategy
//!
//! Every provider is scored for every classified resource on cost,
//! performance fit, reliability, data-transfer affinity and lock-in. A
//! provider change is recommended only when the winner leads the current
//! provider by more than the significance threshold.

mod complexity;
mod scoring;
mod strategy;

pub use complexity::{assess_complexity, level_for_score};
pub use scoring::{cost_factor, FactorScores, FactorWeights, ProviderScoreSet, ScoringModel};
pub use strategy::{
    assess_lock_in_risk, assess_migration_risk, synthesize_strategy, Phase, PhaseEntry,
    RiskAssessment, RiskRating, Strategy, StrategySummary, PHASE_COMPLEX, PHASE_PERFORMANCE_LED,
    PHASE_QUICK_WINS, PHASE_STRATEGIC,
};

use crate::classifier::classify;
use crate::collector::{collect_all_resources, ResourceCollector, DEFAULT_COLLECTOR_TIMEOUT};
use crate::models::{
    round_cents, ClassifiedInventory, ConfidenceScore, Provider, Recommendation,
    RecommendationStatus, ResourceInventory, WorkloadClassification,
};
use crate::observability::{AdvisorMetrics, StructuredLogger};
use crate::pricing::{CostEstimate, CostPeriod, PricingAnalyzer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

pub const STAY_PUT_REASON: &str = "Current provider is already optimal for this workload.";

/// Turn one classification and its cost estimate into a recommendation
pub fn recommend(
    model: &ScoringModel,
    workload: &WorkloadClassification,
    estimate: &CostEstimate,
) -> Recommendation {
    let current = estimate.current_provider;
    let scores = model.score(workload, estimate);
    let best = scores.best();
    let diff = scores.composite_for(best) - scores.composite_for(current);

    let mut rec = Recommendation {
        resource_id: workload.resource_id.clone(),
        resource_type: workload.resource_type.clone(),
        resource_kind: workload.kind,
        current_provider: current,
        recommended_provider: current,
        current_cost: estimate.current_cost(),
        estimated_savings: 0.0,
        confidence_score: ConfidenceScore::FULL,
        reasoning: Vec::new(),
        migration_complexity: assess_complexity(workload, current, current),
        classifications: workload.classifications.clone(),
        compliance: workload.compliance.clone(),
        status: RecommendationStatus::Pending,
    };

    if best != current && diff > model.significance_threshold {
        rec.recommended_provider = best;
        rec.estimated_savings = round_cents(estimate.current_cost() - estimate.cost_for(best));
        rec.confidence_score = ConfidenceScore::from_percent(diff * 100.0);
        rec.reasoning = explain(&scores, workload, current, best);
        rec.migration_complexity = assess_complexity(workload, current, best);
    } else {
        rec.reasoning.push(STAY_PUT_REASON.to_string());
    }

    rec
}

/// One sentence per factor on which the winner leads the current provider
fn explain(
    scores: &ProviderScoreSet,
    workload: &WorkloadClassification,
    current: Provider,
    best: Provider,
) -> Vec<String> {
    let cur = scores.factors_for(current);
    let win = scores.factors_for(best);
    let label = best.label();
    let mut reasons = Vec::new();

    if win.cost > cur.cost {
        reasons.push(format!("{} offers a lower cost for this workload type.", label));
    }
    if win.performance > cur.performance {
        reasons.push(format!(
            "{} provides better performance for {} workloads.",
            label, workload.primary_type
        ));
    }
    if win.reliability > cur.reliability {
        reasons.push(format!("{} has a stronger reliability track record.", label));
    }
    if win.data_transfer > cur.data_transfer {
        reasons.push(format!(
            "Moving to {} would reduce data transfer costs or latency.",
            label
        ));
    }
    if win.lock_in > cur.lock_in {
        reasons.push(format!("{} reduces vendor lock-in exposure.", label));
    }

    reasons
}

/// Output of one full recommendation pass
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRun {
    pub generated_at: DateTime<Utc>,
    pub resources: ResourceInventory,
    pub classifications: ClassifiedInventory,
    pub recommendations: Vec<Recommendation>,
    pub strategy: Strategy,
}

/// Orchestrates collection, classification, pricing and scoring
pub struct RecommendationEngine {
    collector: Arc<dyn ResourceCollector>,
    pricing: Arc<PricingAnalyzer>,
    model: ScoringModel,
    period: CostPeriod,
    collector_timeout: Duration,
    logger: StructuredLogger,
    metrics: Option<AdvisorMetrics>,
}

impl RecommendationEngine {
    pub fn new(collector: Arc<dyn ResourceCollector>, pricing: Arc<PricingAnalyzer>) -> Self {
        Self {
            collector,
            pricing,
            model: ScoringModel::default(),
            period: CostPeriod::Monthly,
            collector_timeout: DEFAULT_COLLECTOR_TIMEOUT,
            logger: StructuredLogger::new("cloud-advisor"),
            metrics: None,
        }
    }

    pub fn with_model(mut self, model: ScoringModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_period(mut self, period: CostPeriod) -> Self {
        self.period = period;
        self
    }

    pub fn with_collector_timeout(mut self, timeout: Duration) -> Self {
        self.collector_timeout = timeout;
        self
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_metrics(mut self, metrics: AdvisorMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Collect, classify and score every resource, then build the strategy
    ///
    /// Providers that fail or are not configured contribute no entries.
    pub async fn generate_recommendations(&self) -> RecommendationRun {
        let start = Instant::now();
        let resources = collect_all_resources(
            self.collector.as_ref(),
            self.collector_timeout,
            &self.logger,
            self.metrics.as_ref(),
        )
        .await;

        let run = self.recommend_inventory(resources).await;

        if let Some(m) = &self.metrics {
            m.observe_recommendation_latency(start.elapsed().as_secs_f64());
            m.set_run_totals(run.recommendations.len(), run.strategy.summary.recommended_moves);
        }
        info!(
            resources = run.recommendations.len(),
            moves = run.strategy.summary.recommended_moves,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Recommendation run complete"
        );
        run
    }

    /// Score an already-collected inventory
    pub async fn recommend_inventory(&self, resources: ResourceInventory) -> RecommendationRun {
        let mut classifications = ClassifiedInventory::new();
        let mut recommendations = Vec::new();

        for (provider, groups) in &resources {
            for (group, items) in groups {
                let mut classified = Vec::with_capacity(items.len());

                for resource in items {
                    let workload = classify(resource);

                    if !resource.has_identifier() {
                        warn!(
                            provider = %provider,
                            group = %group,
                            resource_type = %resource.resource_type,
                            "Skipping resource without identifier"
                        );
                        classified.push(workload);
                        continue;
                    }

                    let estimate = self.pricing.estimate_cost(resource, self.period).await;
                    let rec = recommend(&self.model, &workload, &estimate);
                    self.logger.log_recommendation(&rec);
                    recommendations.push(rec);
                    classified.push(workload);
                }

                classifications
                    .entry(*provider)
                    .or_default()
                    .insert(group.clone(), classified);
            }
        }

        let strategy = synthesize_strategy(&recommendations);
        RecommendationRun {
            generated_at: Utc::now(),
            resources,
            classifications,
            recommendations,
            strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::ResourceGroups;
    use crate::error::{AdvisorError, Result};
    use crate::models::{Archetype, Level, Provider, Resource, ResourceKind};
    use crate::pricing::{ProviderCost, StaticPricingSource};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    fn estimate(current: Provider, costs: [f64; 3]) -> CostEstimate {
        CostEstimate {
            resource_id: "r-1".into(),
            period: CostPeriod::Monthly,
            current_provider: current,
            costs: Provider::ALL
                .iter()
                .zip(costs)
                .map(|(p, cost)| {
                    (
                        *p,
                        ProviderCost {
                            resource_type: "x".into(),
                            region: "r".into(),
                            cost,
                        },
                    )
                })
                .collect(),
        }
    }

    fn workload(primary: Archetype) -> WorkloadClassification {
        WorkloadClassification {
            resource_id: "r-1".into(),
            resource_type: "m5.large".into(),
            kind: ResourceKind::Instance,
            provider: Provider::Aws,
            classifications: vec![primary],
            primary_type: primary,
            compliance: Vec::new(),
        }
    }

    /// Model with performance, reliability and lock-in tied across providers
    fn tied_model() -> ScoringModel {
        let mut model = ScoringModel::default();
        model.strengths.clear();
        for provider in Provider::ALL {
            model.reliability.insert(provider, 0.8);
            model.lock_in.insert(provider, 0.8);
        }
        model
    }

    #[test]
    fn test_cheaper_alternative_wins_on_cost_alone() {
        let rec = recommend(
            &tied_model(),
            &workload(Archetype::General),
            &estimate(Provider::Aws, [100.0, 60.0, 100.0]),
        );

        assert_eq!(rec.recommended_provider, Provider::Azure);
        assert_eq!(rec.estimated_savings, 40.0);
        assert_eq!(rec.reasoning, vec!["AZURE offers a lower cost for this workload type."]);
        assert!(rec.confidence_score.percent() > 10.0);
    }

    #[test]
    fn test_small_lead_keeps_current_provider() {
        let rec = recommend(
            &tied_model(),
            &workload(Archetype::General),
            &estimate(Provider::Aws, [100.0, 90.0, 100.0]),
        );

        assert_eq!(rec.recommended_provider, Provider::Aws);
        assert_eq!(rec.estimated_savings, 0.0);
        assert_eq!(rec.confidence_score.to_string(), "100%");
        assert_eq!(rec.reasoning, vec![STAY_PUT_REASON]);
        assert_eq!(rec.migration_complexity.level, Level::Medium);
    }

    #[test]
    fn test_move_strictly_beats_current_by_threshold() {
        let model = ScoringModel::default();
        for costs in [[100.0, 40.0, 70.0], [50.0, 52.0, 20.0], [10.0, 10.0, 10.0]] {
            let est = estimate(Provider::Aws, costs);
            let wl = workload(Archetype::ComputeIntensive);
            let rec = recommend(&model, &wl, &est);
            let scores = model.score(&wl, &est);

            if rec.recommends_move() {
                let lead = scores.composite_for(rec.recommended_provider)
                    - scores.composite_for(Provider::Aws);
                assert!(lead > 0.1);
            } else {
                assert_eq!(rec.estimated_savings, 0.0);
                assert_eq!(rec.confidence_score, ConfidenceScore::FULL);
            }
        }
    }

    #[test]
    fn test_unpriced_provider_never_wins() {
        let mut model = tied_model();
        model.reliability.insert(Provider::Gcp, 1.0);
        model.lock_in.insert(Provider::Gcp, 1.0);

        let rec = recommend(
            &model,
            &workload(Archetype::General),
            &estimate(Provider::Aws, [100.0, 100.0, 0.0]),
        );

        assert_eq!(rec.recommended_provider, Provider::Aws);
        assert_eq!(rec.estimated_savings, 0.0);
    }

    #[tokio::test]
    async fn test_provider_without_pricing_is_not_recommended() {
        let source = StaticPricingSource::new().without_provider(Provider::Gcp);
        let pricing = PricingAnalyzer::new(Arc::new(source));
        let resource = Resource::new("i-web", "m5.large", ResourceKind::Instance, Provider::Aws)
            .with_region("us-east-1");

        let estimate = pricing.estimate_cost(&resource, CostPeriod::Monthly).await;
        assert_eq!(estimate.cost_for(Provider::Gcp), 0.0);

        let rec = recommend(&ScoringModel::default(), &classify(&resource), &estimate);
        assert_ne!(rec.recommended_provider, Provider::Gcp);
        assert!(rec.estimated_savings >= 0.0);
        assert!(rec.estimated_savings < estimate.current_cost());
    }

    struct FixedCollector;

    #[async_trait]
    impl ResourceCollector for FixedCollector {
        async fn configured_providers(&self) -> Vec<Provider> {
            vec![Provider::Aws]
        }

        async fn collect_resources(&self, provider: Provider) -> Result<ResourceGroups> {
            if provider != Provider::Aws {
                return Err(AdvisorError::ProviderNotConfigured(provider));
            }
            Ok(BTreeMap::from([(
                "ec2".to_string(),
                vec![
                    Resource::new("i-1", "c5.large", ResourceKind::Instance, provider)
                        .with_region("us-east-1"),
                    Resource::new("", "t2.micro", ResourceKind::Instance, provider),
                    Resource::new("db-1", "db.m5.large", ResourceKind::Database, provider)
                        .with_engine("postgres")
                        .with_tag("HIPAA", "phi"),
                ],
            )]))
        }
    }

    #[tokio::test]
    async fn test_engine_end_to_end() {
        let pricing = Arc::new(PricingAnalyzer::new(Arc::new(StaticPricingSource::new())));
        let engine = RecommendationEngine::new(Arc::new(FixedCollector), pricing);

        let run = engine.generate_recommendations().await;

        // Unidentified resource is classified but not recommended
        assert_eq!(run.classifications[&Provider::Aws]["ec2"].len(), 3);
        assert_eq!(run.recommendations.len(), 2);
        assert_eq!(run.strategy.summary.total_resources, 2);

        let db = run
            .recommendations
            .iter()
            .find(|r| r.resource_id == "db-1")
            .unwrap();
        assert_eq!(db.migration_complexity.level, Level::High);
    }
}
