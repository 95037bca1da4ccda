//! Per-strategy migration step tables

use super::strategies::MigrationStrategy;
use crate::models::Provider;
use serde::{Deserialize, Serialize};

pub const PHASE_PLANNING: &str = "Planning";
pub const PHASE_PREPARATION: &str = "Preparation";
pub const PHASE_MIGRATION: &str = "Migration";
pub const PHASE_DEVELOPMENT: &str = "Development";
pub const PHASE_EXECUTION: &str = "Execution";
pub const PHASE_DOCUMENTATION: &str = "Documentation";
pub const PHASE_OPTIMIZATION: &str = "Optimization";
pub const PHASE_POST_MIGRATION: &str = "Post-Migration";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub name: String,
    pub description: String,
}

/// Ordered group of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPhase {
    pub phase: String,
    pub steps: Vec<PlanStep>,
}

type StepTable = &'static [(&'static str, &'static str)];

const PLANNING: StepTable = &[
    (
        "Detailed Assessment",
        "Perform a deep analysis of the application dependencies, architecture, and requirements",
    ),
    (
        "Create Migration Plan",
        "Develop a detailed timeline, resource allocation, and technical migration plan",
    ),
    (
        "Establish Success Criteria",
        "Define metrics and KPIs to measure migration success",
    ),
];

const POST_MIGRATION: StepTable = &[
    (
        "Validation and Testing",
        "Perform thorough validation of the migrated system",
    ),
    (
        "Performance Tuning",
        "Optimize performance in the new environment",
    ),
    ("Monitoring Setup", "Implement monitoring and alerting"),
    (
        "Decommission Source",
        "Once stable, decommission the original resources",
    ),
];

const REHOST_PREPARATION: StepTable = &[
    ("Create Target Environment", "Set up the target environment in {target}"),
    (
        "Set Up Migration Tools",
        "Configure and test the selected migration tools",
    ),
    (
        "Create Backup",
        "Create a complete backup of the source environment",
    ),
];

const REHOST_MIGRATION: StepTable = &[
    (
        "Test Migration",
        "Perform a test migration to validate the process",
    ),
    (
        "Schedule Downtime",
        "Schedule and communicate the migration window",
    ),
    ("Perform Migration", "Execute the migration process"),
    (
        "Verify Data Integrity",
        "Validate that all data has been migrated correctly",
    ),
];

const REPLATFORM_PREPARATION: StepTable = &[
    (
        "Identify Optimization Opportunities",
        "Determine specific optimizations to make during migration",
    ),
    (
        "Create Target Environment",
        "Set up the optimized target environment in {target}",
    ),
    (
        "Refine Data Migration Strategy",
        "Plan for data schema changes or transformations",
    ),
];

const REPLATFORM_MIGRATION: StepTable = &[
    (
        "Implement Target Optimizations",
        "Apply the planned optimizations in the target environment",
    ),
    (
        "Test Migration Process",
        "Validate the migration and optimization process",
    ),
    (
        "Migrate Data with Transformations",
        "Execute data migration with necessary transformations",
    ),
    (
        "Perform Application Migration",
        "Migrate the application components with optimizations",
    ),
];

const REFACTOR_PREPARATION: StepTable = &[
    (
        "Application Architecture Redesign",
        "Redesign the application architecture to better leverage cloud capabilities",
    ),
    (
        "Code Refactoring Plan",
        "Develop a detailed plan for code changes required",
    ),
    (
        "Data Model Redesign",
        "Optimize data models for the target platform",
    ),
];

const REFACTOR_DEVELOPMENT: StepTable = &[
    (
        "Develop Refactored Components",
        "Implement the architectural and code changes",
    ),
    (
        "Set Up CI/CD Pipeline",
        "Establish continuous integration and deployment pipelines",
    ),
    (
        "Develop Data Migration Scripts",
        "Create scripts for data transformation and migration",
    ),
];

const REFACTOR_MIGRATION: StepTable = &[
    (
        "Deploy Refactored Application",
        "Deploy the redesigned application to the target environment",
    ),
    (
        "Migrate and Transform Data",
        "Execute data migration with transformations",
    ),
    (
        "Parallel Running Period",
        "Run both old and new systems in parallel during transition",
    ),
    (
        "Cutover to New System",
        "Gradually shift traffic to the new system",
    ),
];

const REPURCHASE_PREPARATION: StepTable = &[
    (
        "Vendor Selection",
        "Evaluate and select the replacement SaaS solution",
    ),
    (
        "Feature Mapping",
        "Map current functionality to new solution capabilities",
    ),
    (
        "Data Export Planning",
        "Plan how to extract data from the current system",
    ),
];

const REPURCHASE_MIGRATION: StepTable = &[
    (
        "Configure New Solution",
        "Set up and configure the new SaaS solution",
    ),
    (
        "Export and Transform Data",
        "Extract and transform data for the new system",
    ),
    (
        "Import Data",
        "Import the transformed data into the new system",
    ),
    ("User Training", "Train users on the new system"),
    ("Cutover to New System", "Switch users to the new solution"),
];

const RETIRE_PREPARATION: StepTable = &[
    (
        "Data Archiving Plan",
        "Develop a plan to archive necessary data",
    ),
    ("User Communication", "Communicate retirement plans to users"),
    (
        "Dependency Analysis",
        "Identify and plan for handling dependent systems",
    ),
];

const RETIRE_EXECUTION: StepTable = &[
    ("Data Archiving", "Archive required data for retention"),
    (
        "Update Dependent Systems",
        "Modify systems that depend on the retiring application",
    ),
    (
        "Decommission Application",
        "Shut down and remove the application",
    ),
    (
        "Resource Cleanup",
        "Clean up and reclaim infrastructure resources",
    ),
];

const RETAIN_DOCUMENTATION: StepTable = &[
    (
        "Document Decision Rationale",
        "Document reasons for retaining the current system",
    ),
    (
        "Set Future Review Date",
        "Schedule a date to revisit the migration decision",
    ),
];

const RETAIN_OPTIMIZATION: StepTable = &[
    (
        "Identify On-Premises Optimizations",
        "Look for ways to optimize the current deployment",
    ),
    (
        "Implement Cost-Saving Measures",
        "Apply any possible cost optimizations in the current environment",
    ),
];

/// Strategy-specific phases, between Planning and Post-Migration
fn strategy_phases(strategy: MigrationStrategy) -> &'static [(&'static str, StepTable)] {
    match strategy {
        MigrationStrategy::Rehost => &[
            (PHASE_PREPARATION, REHOST_PREPARATION),
            (PHASE_MIGRATION, REHOST_MIGRATION),
        ],
        MigrationStrategy::Replatform => &[
            (PHASE_PREPARATION, REPLATFORM_PREPARATION),
            (PHASE_MIGRATION, REPLATFORM_MIGRATION),
        ],
        MigrationStrategy::Refactor => &[
            (PHASE_PREPARATION, REFACTOR_PREPARATION),
            (PHASE_DEVELOPMENT, REFACTOR_DEVELOPMENT),
            (PHASE_MIGRATION, REFACTOR_MIGRATION),
        ],
        MigrationStrategy::Repurchase => &[
            (PHASE_PREPARATION, REPURCHASE_PREPARATION),
            (PHASE_MIGRATION, REPURCHASE_MIGRATION),
        ],
        MigrationStrategy::Retire => &[
            (PHASE_PREPARATION, RETIRE_PREPARATION),
            (PHASE_EXECUTION, RETIRE_EXECUTION),
        ],
        MigrationStrategy::Retain => &[
            (PHASE_DOCUMENTATION, RETAIN_DOCUMENTATION),
            (PHASE_OPTIMIZATION, RETAIN_OPTIMIZATION),
        ],
    }
}

fn build_phase(phase: &str, table: StepTable, target: Provider) -> PlanPhase {
    PlanPhase {
        phase: phase.to_string(),
        steps: table
            .iter()
            .map(|(name, description)| PlanStep {
                name: name.to_string(),
                description: description.replace("{target}", target.label()),
            })
            .collect(),
    }
}

/// Ordered phases for a strategy moving a resource to `target`
pub fn generate_steps(strategy: MigrationStrategy, target: Provider) -> Vec<PlanPhase> {
    let mut phases = vec![build_phase(PHASE_PLANNING, PLANNING, target)];

    phases.extend(
        strategy_phases(strategy)
            .iter()
            .map(|(phase, table)| build_phase(phase, *table, target)),
    );

    if strategy.has_post_migration() {
        phases.push(build_phase(PHASE_POST_MIGRATION, POST_MIGRATION, target));
    }

    phases
}
