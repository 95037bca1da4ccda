//! Risk and mitigation tables

use super::strategies::{is_database, MigrationStrategy};
use crate::models::{Archetype, Level, Recommendation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    #[serde(rename = "type")]
    pub risk_type: String,
    pub severity: Level,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mitigation {
    pub risk: String,
    pub action: String,
}

/// (type, severity, description, mitigation action)
type RiskEntry = (&'static str, Level, &'static str, &'static str);

const COMMON_RISKS: &[RiskEntry] = &[
    (
        "Data Loss Risk",
        Level::High,
        "Risk of data loss during migration",
        "Create full backups before migration and validate data integrity after transfer",
    ),
    (
        "Downtime Impact",
        Level::Medium,
        "Service disruption during migration affecting users",
        "Schedule migration during low-traffic periods and communicate maintenance windows",
    ),
];

const DATABASE_RISK: RiskEntry = (
    "Data Compatibility Issues",
    Level::High,
    "Database engine differences may cause compatibility problems",
    "Test with a subset of data first and address schema compatibility issues",
);

const AVAILABILITY_RISK: RiskEntry = (
    "Availability Impact",
    Level::High,
    "Migration may affect high-availability requirements",
    "Implement a phased migration approach with fallback options",
);

fn strategy_risks(strategy: MigrationStrategy) -> &'static [RiskEntry] {
    match strategy {
        MigrationStrategy::Rehost => &[(
            "Performance Issues",
            Level::Medium,
            "Different infrastructure characteristics may affect performance",
            "Conduct performance testing and adjust resource allocations as needed",
        )],
        MigrationStrategy::Replatform => &[
            (
                "Optimization Complications",
                Level::Medium,
                "Optimizations may introduce unexpected behaviors",
                "Test each optimization individually before full migration",
            ),
            (
                "Data Transformation Errors",
                Level::High,
                "Errors in data schema changes or transformations",
                "Thoroughly test data migration scripts with sample data before full migration",
            ),
        ],
        MigrationStrategy::Refactor => &[
            (
                "Project Complexity",
                Level::High,
                "Increased scope and complexity may lead to delays or budget overruns",
                "Break the refactoring into smaller, manageable phases with clear milestones",
            ),
            (
                "New Architectural Flaws",
                Level::Medium,
                "Redesigned architecture may introduce new issues",
                "Conduct thorough architecture reviews and testing before implementation",
            ),
        ],
        MigrationStrategy::Repurchase => &[
            (
                "Feature Parity Gaps",
                Level::High,
                "New solution may not have all features of the current system",
                "Conduct thorough feature mapping and gap analysis during vendor selection",
            ),
            (
                "User Adoption Issues",
                Level::Medium,
                "Users may resist change to a new system",
                "Invest in comprehensive training and change management",
            ),
        ],
        MigrationStrategy::Retire => &[
            (
                "Unknown Dependencies",
                Level::High,
                "Undocumented systems may depend on the application being retired",
                "Perform thorough dependency analysis and monitor for issues during gradual shutdown",
            ),
            (
                "Data Retention Compliance",
                Level::High,
                "Failing to retain required data may violate regulations",
                "Consult legal/compliance teams to ensure proper data archiving",
            ),
        ],
        MigrationStrategy::Retain => &[
            (
                "Opportunity Cost",
                Level::Medium,
                "Missing potential benefits of cloud migration",
                "Regularly reassess the decision and monitor changes in business needs",
            ),
            (
                "Technical Debt",
                Level::Medium,
                "Continued accumulation of technical debt in legacy system",
                "Implement maintenance best practices and continue modernization where possible",
            ),
        ],
    }
}

/// Risks with one mitigation each: common, then strategy, then resource-specific
pub fn assess_risks(
    rec: &Recommendation,
    strategy: MigrationStrategy,
) -> (Vec<Risk>, Vec<Mitigation>) {
    let mut entries: Vec<&RiskEntry> = COMMON_RISKS
        .iter()
        .chain(strategy_risks(strategy))
        .collect();

    if is_database(rec) {
        entries.push(&DATABASE_RISK);
    }
    if rec.has(Archetype::HighAvailability) {
        entries.push(&AVAILABILITY_RISK);
    }

    entries
        .into_iter()
        .map(|(risk_type, severity, description, action)| {
            (
                Risk {
                    risk_type: risk_type.to_string(),
                    severity: *severity,
                    description: description.to_string(),
                },
                Mitigation {
                    risk: risk_type.to_string(),
                    action: action.to_string(),
                },
            )
        })
        .unzip()
}
