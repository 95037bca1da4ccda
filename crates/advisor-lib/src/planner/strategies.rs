//! Migration strategy catalogue and selection rules

use crate::models::{Archetype, Level, Recommendation, ResourceKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six named approaches to moving or handling a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStrategy {
    Rehost,
    Replatform,
    Refactor,
    Repurchase,
    Retire,
    Retain,
}

/// Coarse speed class of a strategy, combined with complexity for the estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    Fast,
    Medium,
    Slow,
    None,
}

impl MigrationStrategy {
    pub const ALL: [MigrationStrategy; 6] = [
        MigrationStrategy::Rehost,
        MigrationStrategy::Replatform,
        MigrationStrategy::Refactor,
        MigrationStrategy::Repurchase,
        MigrationStrategy::Retire,
        MigrationStrategy::Retain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStrategy::Rehost => "rehost",
            MigrationStrategy::Replatform => "replatform",
            MigrationStrategy::Refactor => "refactor",
            MigrationStrategy::Repurchase => "repurchase",
            MigrationStrategy::Retire => "retire",
            MigrationStrategy::Retain => "retain",
        }
    }

    /// Display name used in plans
    pub fn name(&self) -> &'static str {
        match self {
            MigrationStrategy::Rehost => "Rehost (Lift & Shift)",
            MigrationStrategy::Replatform => "Replatform (Lift & Optimize)",
            MigrationStrategy::Refactor => "Refactor / Re-architect",
            MigrationStrategy::Repurchase => "Repurchase (Drop & Shop)",
            MigrationStrategy::Retire => "Retire",
            MigrationStrategy::Retain => "Retain (Revisit)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MigrationStrategy::Rehost => "Move an application to a new host with minimal changes",
            MigrationStrategy::Replatform => "Move to a new platform with some optimizations",
            MigrationStrategy::Refactor => {
                "Significantly change the application to better leverage cloud capabilities"
            }
            MigrationStrategy::Repurchase => "Replace with a different product, typically SaaS",
            MigrationStrategy::Retire => {
                "Decommission or remove applications that are no longer needed"
            }
            MigrationStrategy::Retain => "Keep applications as-is with no changes",
        }
    }

    pub fn best_for(&self) -> &'static [&'static str] {
        match self {
            MigrationStrategy::Rehost => &[
                "Virtual machines",
                "Simple web applications",
                "Legacy applications",
            ],
            MigrationStrategy::Replatform => &[
                "Applications needing minor optimizations",
                "Database migrations",
            ],
            MigrationStrategy::Refactor => &[
                "Applications needing major optimizations",
                "Legacy applications that need modernization",
            ],
            MigrationStrategy::Repurchase => &[
                "Commodity applications",
                "CRM, Email, Collaboration tools",
            ],
            MigrationStrategy::Retire => &["Redundant applications", "Low-value applications"],
            MigrationStrategy::Retain => &[
                "Critical applications with compliance requirements",
                "Applications recently upgraded",
            ],
        }
    }

    /// (complexity, risk, cost savings) labels
    fn labels(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            MigrationStrategy::Rehost => ("Low", "Low", "Minimal"),
            MigrationStrategy::Replatform => ("Medium", "Medium", "Moderate"),
            MigrationStrategy::Refactor => ("High", "High", "High"),
            MigrationStrategy::Repurchase => ("Medium", "Medium", "Variable"),
            MigrationStrategy::Retire => ("Low", "Low", "High"),
            MigrationStrategy::Retain => ("None", "None", "None"),
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        match self {
            MigrationStrategy::Rehost => Timeframe::Fast,
            MigrationStrategy::Replatform => Timeframe::Medium,
            MigrationStrategy::Refactor => Timeframe::Slow,
            MigrationStrategy::Repurchase => Timeframe::Fast,
            MigrationStrategy::Retire => Timeframe::Fast,
            MigrationStrategy::Retain => Timeframe::None,
        }
    }

    /// Fixed suitability ranking of the two next-best strategies
    pub fn alternatives(&self) -> [MigrationStrategy; 2] {
        use MigrationStrategy::*;
        match self {
            Rehost => [Replatform, Retain],
            Replatform => [Rehost, Refactor],
            Refactor => [Replatform, Rehost],
            Repurchase => [Replatform, Retire],
            Retire => [Retain, Repurchase],
            Retain => [Rehost, Replatform],
        }
    }

    /// Whether a Post-Migration phase follows the strategy-specific steps
    pub fn has_post_migration(&self) -> bool {
        !matches!(self, MigrationStrategy::Retain | MigrationStrategy::Retire)
    }

    pub fn profile(&self) -> StrategyProfile {
        let (complexity, risk, cost_savings) = self.labels();
        StrategyProfile {
            strategy: *self,
            name: self.name().to_string(),
            description: self.description().to_string(),
            best_for: self.best_for().iter().map(|s| s.to_string()).collect(),
            complexity: complexity.to_string(),
            risk: risk.to_string(),
            timeframe: self.timeframe(),
            cost_savings: cost_savings.to_string(),
        }
    }
}

impl fmt::Display for MigrationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable description of a strategy as it appears in a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyProfile {
    pub strategy: MigrationStrategy,
    pub name: String,
    pub description: String,
    pub best_for: Vec<String>,
    pub complexity: String,
    pub risk: String,
    pub timeframe: Timeframe,
    pub cost_savings: String,
}

/// Selection rule; the last matching rule in [`STRATEGY_OVERRIDES`] wins
pub struct StrategyOverride {
    pub strategy: MigrationStrategy,
    pub applies: fn(&Recommendation) -> bool,
}

/// Override chain evaluated after the `rehost` default, in order
pub const STRATEGY_OVERRIDES: &[StrategyOverride] = &[
    StrategyOverride {
        strategy: MigrationStrategy::Replatform,
        applies: is_database,
    },
    StrategyOverride {
        strategy: MigrationStrategy::Refactor,
        applies: is_high_complexity,
    },
    StrategyOverride {
        strategy: MigrationStrategy::Retain,
        applies: is_low_value_high_complexity,
    },
    StrategyOverride {
        strategy: MigrationStrategy::Retire,
        applies: is_obsolete,
    },
    StrategyOverride {
        strategy: MigrationStrategy::Repurchase,
        applies: is_commodity,
    },
];

/// Savings below which a high-complexity move is not worth doing
pub const RETAIN_SAVINGS_THRESHOLD: f64 = 100.0;

pub fn select_strategy(rec: &Recommendation) -> MigrationStrategy {
    STRATEGY_OVERRIDES
        .iter()
        .rev()
        .find(|rule| (rule.applies)(rec))
        .map(|rule| rule.strategy)
        .unwrap_or(MigrationStrategy::Rehost)
}

/// Database kind, a db-ish type name, or the database archetype
pub fn is_database(rec: &Recommendation) -> bool {
    let ty = rec.resource_type.to_lowercase();
    rec.resource_kind == ResourceKind::Database
        || ty.contains("db")
        || ty.contains("database")
        || rec.has(Archetype::Database)
}

fn is_high_complexity(rec: &Recommendation) -> bool {
    rec.migration_complexity.level == Level::High
}

fn is_low_value_high_complexity(rec: &Recommendation) -> bool {
    rec.estimated_savings < RETAIN_SAVINGS_THRESHOLD && is_high_complexity(rec)
}

fn is_obsolete(rec: &Recommendation) -> bool {
    rec.has(Archetype::Obsolete)
}

fn is_commodity(rec: &Recommendation) -> bool {
    rec.classifications.iter().any(|a| a.is_commodity())
}

/// Calendar estimate for a strategy speed class at a complexity level
pub fn estimate_timeframe(timeframe: Timeframe, level: Level) -> &'static str {
    match (timeframe, level) {
        (Timeframe::Fast, Level::Low) => "1-2 weeks",
        (Timeframe::Fast, Level::Medium) => "2-4 weeks",
        (Timeframe::Fast, Level::High) => "1-2 months",
        (Timeframe::Medium, Level::Low) => "1-2 months",
        (Timeframe::Medium, Level::Medium) => "2-3 months",
        (Timeframe::Medium, Level::High) => "3-6 months",
        (Timeframe::Slow, Level::Low) => "3-6 months",
        (Timeframe::Slow, Level::Medium) => "6-9 months",
        (Timeframe::Slow, Level::High) => "9-12 months",
        (Timeframe::None, _) => "N/A",
    }
}
