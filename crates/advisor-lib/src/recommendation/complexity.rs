//! Migration-complexity assessment

use crate::models::{Archetype, Level, MigrationComplexity, Provider, WorkloadClassification};

const BASE_SCORE: f64 = 0.5;
const DATABASE_SCORE: f64 = 0.8;
const STATELESS_SCORE: f64 = 0.3;
const COMPLIANCE_FLOOR: f64 = 0.9;
const TOOLING_DEDUCTION: f64 = 0.1;

/// Bucket a complexity score: <0.4 Low, <0.7 Medium, else High
pub fn level_for_score(score: f64) -> Level {
    if score < 0.4 {
        Level::Low
    } else if score < 0.7 {
        Level::Medium
    } else {
        Level::High
    }
}

/// Assess how hard moving `workload` from `current` to `target` would be
///
/// Also used when the resource stays put (`target == current`) so every
/// recommendation carries an assessment.
pub fn assess_complexity(
    workload: &WorkloadClassification,
    current: Provider,
    target: Provider,
) -> MigrationComplexity {
    let mut score = BASE_SCORE;
    let mut factors = Vec::new();

    if workload.has(Archetype::Database) {
        score = DATABASE_SCORE;
        factors.push(
            "Database migrations require careful data transfer and schema compatibility validation"
                .to_string(),
        );
    } else if workload.has(Archetype::Stateless) || workload.has(Archetype::Batch) {
        score = STATELESS_SCORE;
        factors.push("Stateless workloads are typically easier to migrate".to_string());
    }

    if !workload.compliance.is_empty() {
        score = score.max(COMPLIANCE_FLOOR);
        factors.push("Compliance requirements add migration complexity".to_string());
    }

    if current == Provider::Aws && target == Provider::Azure {
        score -= TOOLING_DEDUCTION;
        factors.push("AWS to Azure migration tooling available".to_string());
    }

    let score = (score * 100.0).round() / 100.0;
    MigrationComplexity {
        level: level_for_score(score),
        score,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComplianceRequirement, ResourceKind};

    fn workload(classes: Vec<Archetype>) -> WorkloadClassification {
        WorkloadClassification {
            resource_id: "r-1".into(),
            resource_type: "m5.large".into(),
            kind: ResourceKind::Instance,
            provider: Provider::Aws,
            primary_type: classes.first().copied().unwrap_or(Archetype::General),
            classifications: classes,
            compliance: Vec::new(),
        }
    }

    #[test]
    fn test_default_is_medium() {
        let c = assess_complexity(
            &workload(vec![Archetype::General]),
            Provider::Aws,
            Provider::Gcp,
        );
        assert_eq!(c.level, Level::Medium);
        assert_eq!(c.score, 0.5);
        assert!(c.factors.is_empty());
    }

    #[test]
    fn test_database_with_compliance_is_high() {
        let mut w = workload(vec![Archetype::Database]);
        w.compliance.push(ComplianceRequirement {
            framework: "HIPAA".into(),
            requirement: "true".into(),
        });

        // The AWS->Azure deduction cannot pull a compliance workload below High
        let c = assess_complexity(&w, Provider::Aws, Provider::Azure);
        assert_eq!(c.level, Level::High);
        assert_eq!(c.score, 0.8);
        assert_eq!(c.factors.len(), 3);
    }

    #[test]
    fn test_batch_to_azure_is_low() {
        let c = assess_complexity(
            &workload(vec![Archetype::Batch]),
            Provider::Aws,
            Provider::Azure,
        );
        assert_eq!(c.level, Level::Low);
        assert_eq!(c.score, 0.2);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for_score(0.39), Level::Low);
        assert_eq!(level_for_score(0.4), Level::Medium);
        assert_eq!(level_for_score(0.7), Level::High);
    }
}
