//! Organisation-wide phased migration strategy

use crate::models::{round_cents, Level, Provider, Recommendation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PHASE_QUICK_WINS: &str = "Phase 1 - Quick Wins";
pub const PHASE_STRATEGIC: &str = "Phase 2 - Strategic Migrations";
pub const PHASE_COMPLEX: &str = "Phase 3 - Complex Transformations";
pub const PHASE_PERFORMANCE_LED: &str = "Phase 4 - Performance-Led Moves";

const MITIGATIONS: &[&str] = &[
    "Implement a cloud-agnostic containerization strategy using Kubernetes",
    "Develop infrastructure-as-code templates for multiple providers",
    "Use abstraction layers for cloud-specific services",
    "Maintain up-to-date documentation of all inter-service dependencies",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub total_resources: usize,
    pub recommended_moves: usize,
    pub estimated_total_savings: f64,
    /// Percentage of resources recommended for each provider
    pub distribution: BTreeMap<Provider, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEntry {
    pub resource_id: String,
    pub current_provider: Provider,
    pub target_provider: Provider,
    pub estimated_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub description: String,
    pub resources: Vec<PhaseEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRating {
    pub level: Level,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub vendor_lock_in: RiskRating,
    pub migration: RiskRating,
    pub cost_variability: Level,
    pub mitigations: Vec<String>,
}

/// Aggregate view over one run's recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub summary: StrategySummary,
    pub phases: Vec<Phase>,
    pub risk_assessment: RiskAssessment,
}

impl Strategy {
    pub fn phase(&self, name: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.name == name)
    }
}

fn phase_of(rec: &Recommendation) -> &'static str {
    match rec.migration_complexity.level {
        Level::High => PHASE_COMPLEX,
        _ if rec.estimated_savings <= 0.0 => PHASE_PERFORMANCE_LED,
        Level::Low => PHASE_QUICK_WINS,
        Level::Medium => PHASE_STRATEGIC,
    }
}

fn phase_description(name: &str) -> &'static str {
    match name {
        PHASE_QUICK_WINS => "Low complexity migrations with high saving potential",
        PHASE_STRATEGIC => "Medium complexity migrations with good ROI",
        PHASE_COMPLEX => "High complexity migrations requiring significant planning",
        _ => "Moves justified by performance or reliability rather than cost",
    }
}

/// Build the phased strategy and risk assessment for a set of recommendations
pub fn synthesize_strategy(recommendations: &[Recommendation]) -> Strategy {
    let total = recommendations.len();
    let moves: Vec<&Recommendation> = recommendations
        .iter()
        .filter(|r| r.recommends_move())
        .collect();

    let savings = round_cents(moves.iter().map(|r| r.estimated_savings).sum());

    let mut counts: BTreeMap<Provider, usize> = Provider::ALL.iter().map(|p| (*p, 0)).collect();
    for rec in recommendations {
        *counts.entry(rec.recommended_provider).or_default() += 1;
    }
    let distribution: BTreeMap<Provider, u32> = counts
        .iter()
        .map(|(p, n)| {
            let pct = if total == 0 {
                0
            } else {
                ((*n as f64 / total as f64) * 100.0).round() as u32
            };
            (*p, pct)
        })
        .collect();

    let phases: Vec<Phase> = [
        PHASE_QUICK_WINS,
        PHASE_STRATEGIC,
        PHASE_COMPLEX,
        PHASE_PERFORMANCE_LED,
    ]
    .into_iter()
    .map(|name| Phase {
        name: name.to_string(),
        description: phase_description(name).to_string(),
        resources: moves
            .iter()
            .filter(|r| phase_of(r) == name)
            .map(|r| PhaseEntry {
                resource_id: r.resource_id.clone(),
                current_provider: r.current_provider,
                target_provider: r.recommended_provider,
                estimated_savings: r.estimated_savings,
            })
            .collect(),
    })
    .filter(|phase| !phase.resources.is_empty())
    .collect();

    let high_count = phases
        .iter()
        .find(|p| p.name == PHASE_COMPLEX)
        .map(|p| p.resources.len())
        .unwrap_or(0);

    Strategy {
        summary: StrategySummary {
            total_resources: total,
            recommended_moves: moves.len(),
            estimated_total_savings: savings,
            distribution: distribution.clone(),
        },
        phases,
        risk_assessment: RiskAssessment {
            vendor_lock_in: assess_lock_in_risk(&distribution),
            migration: assess_migration_risk(high_count),
            cost_variability: Level::Medium,
            mitigations: MITIGATIONS.iter().map(|m| m.to_string()).collect(),
        },
    }
}

/// Concentration risk from the largest provider share
pub fn assess_lock_in_risk(distribution: &BTreeMap<Provider, u32>) -> RiskRating {
    let top = Provider::ALL
        .iter()
        .map(|p| (*p, distribution.get(p).copied().unwrap_or(0)))
        .fold(None, |best: Option<(Provider, u32)>, (p, pct)| match best {
            Some((_, best_pct)) if best_pct >= pct => best,
            _ => Some((p, pct)),
        });

    match top {
        Some((provider, pct)) if pct > 60 => RiskRating {
            level: Level::High,
            description: format!(
                "High concentration ({}%) of resources in {}",
                pct,
                provider.label()
            ),
        },
        Some((provider, pct)) if pct > 40 => RiskRating {
            level: Level::Medium,
            description: format!(
                "Moderate concentration ({}%) of resources in {}",
                pct,
                provider.label()
            ),
        },
        _ => RiskRating {
            level: Level::Low,
            description: "Well-distributed resources across multiple providers".to_string(),
        },
    }
}

pub fn assess_migration_risk(high_complexity_count: usize) -> RiskRating {
    if high_complexity_count > 10 {
        RiskRating {
            level: Level::High,
            description: format!(
                "Large number ({}) of complex migrations required",
                high_complexity_count
            ),
        }
    } else if high_complexity_count > 3 {
        RiskRating {
            level: Level::Medium,
            description: format!(
                "Moderate number ({}) of complex migrations required",
                high_complexity_count
            ),
        }
    } else {
        RiskRating {
            level: Level::Low,
            description: "Few or no complex migrations required".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfidenceScore, MigrationComplexity, RecommendationStatus, ResourceKind};

    fn rec(id: &str, to: Provider, level: Level, savings: f64) -> Recommendation {
        Recommendation {
            resource_id: id.to_string(),
            resource_type: "m5.large".to_string(),
            resource_kind: ResourceKind::Instance,
            current_provider: Provider::Aws,
            recommended_provider: to,
            current_cost: 100.0,
            estimated_savings: savings,
            confidence_score: ConfidenceScore::from_percent(20.0),
            reasoning: Vec::new(),
            migration_complexity: MigrationComplexity {
                level,
                score: 0.5,
                factors: Vec::new(),
            },
            classifications: Vec::new(),
            compliance: Vec::new(),
            status: RecommendationStatus::Pending,
        }
    }

    #[test]
    fn test_phase_partition_is_exhaustive_and_disjoint() {
        let recs = vec![
            rec("low-pos", Provider::Gcp, Level::Low, 10.0),
            rec("med-pos", Provider::Gcp, Level::Medium, 5.0),
            rec("high-neg", Provider::Azure, Level::High, -3.0),
            rec("low-neg", Provider::Gcp, Level::Low, -1.0),
            rec("stay", Provider::Aws, Level::Medium, 0.0),
        ];

        let strategy = synthesize_strategy(&recs);
        let placed: Vec<&str> = strategy
            .phases
            .iter()
            .flat_map(|p| p.resources.iter().map(|e| e.resource_id.as_str()))
            .collect();

        assert_eq!(placed.len(), 4);
        assert!(!placed.contains(&"stay"));
        assert_eq!(strategy.phase(PHASE_COMPLEX).unwrap().resources[0].resource_id, "high-neg");
        assert_eq!(
            strategy.phase(PHASE_PERFORMANCE_LED).unwrap().resources[0].resource_id,
            "low-neg"
        );
        assert_eq!(strategy.summary.recommended_moves, 4);
        assert_eq!(strategy.summary.estimated_total_savings, 11.0);
    }

    #[test]
    fn test_empty_phases_are_dropped() {
        let strategy = synthesize_strategy(&[rec("a", Provider::Gcp, Level::Low, 5.0)]);
        assert_eq!(strategy.phases.len(), 1);
        assert_eq!(strategy.phases[0].name, PHASE_QUICK_WINS);
    }

    #[test]
    fn test_distribution_and_lock_in() {
        let recs = vec![
            rec("a", Provider::Gcp, Level::Low, 5.0),
            rec("b", Provider::Gcp, Level::Low, 5.0),
            rec("c", Provider::Gcp, Level::Low, 5.0),
            rec("d", Provider::Aws, Level::Low, 0.0),
        ];
        let strategy = synthesize_strategy(&recs);
        assert_eq!(strategy.summary.distribution[&Provider::Gcp], 75);
        assert_eq!(strategy.summary.distribution[&Provider::Azure], 0);
        assert_eq!(strategy.risk_assessment.vendor_lock_in.level, Level::High);
        assert!(strategy.risk_assessment.vendor_lock_in.description.contains("GCP"));
        assert_eq!(strategy.risk_assessment.mitigations.len(), 4);
    }

    #[test]
    fn test_empty_run() {
        let strategy = synthesize_strategy(&[]);
        assert_eq!(strategy.summary.total_resources, 0);
        assert!(strategy.phases.is_empty());
        assert_eq!(strategy.risk_assessment.vendor_lock_in.level, Level::Low);
    }

    #[test]
    fn test_migration_risk_thresholds() {
        assert_eq!(assess_migration_risk(3).level, Level::Low);
        assert_eq!(assess_migration_risk(4).level, Level::Medium);
        assert_eq!(assess_migration_risk(11).level, Level::High);
    }
}
