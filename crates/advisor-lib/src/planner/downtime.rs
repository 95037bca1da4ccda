//! Downtime estimates and minimization suggestions

use super::strategies::{is_database, MigrationStrategy};
use crate::models::{Archetype, Recommendation};
use serde::{Deserialize, Serialize};

pub const NO_DOWNTIME: &str = "None";

const NEAR_ZERO_NOTE: &str = " (can be reduced to near-zero with additional effort)";

const HA_STRATEGIES: &[&str] = &[
    "Implement a zero-downtime migration pattern with failover",
    "Use load balancing to shift traffic gradually with no downtime",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeEstimate {
    pub estimated: String,
    pub minimization_strategies: Vec<String>,
}

fn base_estimate(
    strategy: MigrationStrategy,
    database: bool,
) -> (&'static str, &'static [&'static str]) {
    match (strategy, database) {
        (MigrationStrategy::Rehost, true) => (
            "1-4 hours",
            &[
                "Use database replication to minimize downtime",
                "Implement a blue-green deployment strategy",
            ],
        ),
        (MigrationStrategy::Rehost, false) => (
            "30 minutes to 2 hours",
            &[
                "Prepare everything in advance to minimize cutover time",
                "Use DNS switching for minimal user impact",
            ],
        ),
        (MigrationStrategy::Replatform, true) => (
            "2-8 hours",
            &[
                "Use database replication with schema transformation tools",
                "Consider a phased data migration approach",
            ],
        ),
        (MigrationStrategy::Replatform, false) => (
            "1-4 hours",
            &[
                "Implement a blue-green deployment strategy",
                "Use feature flags to gradually enable new functionality",
            ],
        ),
        (MigrationStrategy::Refactor, _) => (
            "Variable (potentially minimal with proper implementation)",
            &[
                "Implement a strangler pattern to gradually replace functionality",
                "Use traffic shifting to slowly transition to the new system",
                "Run systems in parallel during transition",
            ],
        ),
        (MigrationStrategy::Repurchase, _) => (
            "4-24 hours (depending on data volume)",
            &[
                "Pre-populate the new system before cutover",
                "Consider a phased rollout by user groups or features",
                "Plan for a weekend or off-hours cutover",
            ],
        ),
        (MigrationStrategy::Retire, _) => (
            "Planned complete shutdown",
            &[
                "Provide ample notice to users",
                "Gradually reduce functionality before full retirement",
            ],
        ),
        (MigrationStrategy::Retain, _) => (NO_DOWNTIME, &["No downtime as no migration occurs"]),
    }
}

pub fn estimate_downtime(rec: &Recommendation, strategy: MigrationStrategy) -> DowntimeEstimate {
    let (base, suggestions) = base_estimate(strategy, is_database(rec));
    let mut estimated = base.to_string();
    let mut strategies: Vec<String> = suggestions.iter().map(|s| s.to_string()).collect();

    if rec.has(Archetype::HighAvailability) && base != NO_DOWNTIME {
        strategies.extend(HA_STRATEGIES.iter().map(|s| s.to_string()));
        if !matches!(
            strategy,
            MigrationStrategy::Refactor | MigrationStrategy::Repurchase
        ) {
            estimated.push_str(NEAR_ZERO_NOTE);
        }
    }

    DowntimeEstimate {
        estimated,
        minimization_strategies: dedup_in_order(strategies),
    }
}

/// Drop repeats, keeping the first occurrence
fn dedup_in_order(items: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfidenceScore, Level, MigrationComplexity, Provider, ResourceKind};

    fn rec(kind: ResourceKind, classes: Vec<Archetype>) -> Recommendation {
        Recommendation {
            resource_id: "r-1".to_string(),
            resource_type: "custom".to_string(),
            resource_kind: kind,
            current_provider: Provider::Gcp,
            recommended_provider: Provider::Aws,
            current_cost: 300.0,
            estimated_savings: 120.0,
            confidence_score: ConfidenceScore::from_percent(70.0),
            reasoning: vec![],
            migration_complexity: MigrationComplexity {
                level: Level::Medium,
                score: 0.5,
                factors: vec![],
            },
            classifications: classes,
            compliance: vec![],
            status: Default::default(),
        }
    }

    #[test]
    fn test_database_rehost_window() {
        let d = estimate_downtime(
            &rec(ResourceKind::Database, vec![]),
            MigrationStrategy::Rehost,
        );
        assert_eq!(d.estimated, "1-4 hours");
        assert_eq!(d.minimization_strategies.len(), 2);
    }

    #[test]
    fn test_high_availability_annotation() {
        let r = rec(ResourceKind::Instance, vec![Archetype::HighAvailability]);
        let d = estimate_downtime(&r, MigrationStrategy::Rehost);
        assert_eq!(
            d.estimated,
            "30 minutes to 2 hours (can be reduced to near-zero with additional effort)"
        );
        assert_eq!(d.minimization_strategies.len(), 4);

        let d = estimate_downtime(&r, MigrationStrategy::Refactor);
        assert!(!d.estimated.contains("near-zero"));
        assert_eq!(d.minimization_strategies.len(), 5);
    }

    #[test]
    fn test_retain_has_no_downtime_even_when_ha() {
        let r = rec(ResourceKind::Instance, vec![Archetype::HighAvailability]);
        let d = estimate_downtime(&r, MigrationStrategy::Retain);
        assert_eq!(d.estimated, "None");
        assert_eq!(
            d.minimization_strategies,
            vec!["No downtime as no migration occurs".to_string()]
        );
    }

    #[test]
    fn test_replatform_ha_keeps_base_suggestions_first() {
        let r = rec(ResourceKind::Instance, vec![Archetype::HighAvailability]);
        let d = estimate_downtime(&r, MigrationStrategy::Replatform);
        assert_eq!(d.minimization_strategies.len(), 4);
        assert_eq!(
            d.minimization_strategies[0],
            "Implement a blue-green deployment strategy"
        );
        assert_eq!(d.minimization_strategies[2], HA_STRATEGIES[0]);
    }

    #[test]
    fn test_repeated_suggestions_are_dropped() {
        let blue_green = "Implement a blue-green deployment strategy".to_string();
        let dns = "Use DNS switching for minimal user impact".to_string();
        let unique = dedup_in_order(vec![
            blue_green.clone(),
            dns.clone(),
            blue_green.clone(),
            dns.clone(),
        ]);
        assert_eq!(unique, vec![blue_green, dns]);
    }
}
