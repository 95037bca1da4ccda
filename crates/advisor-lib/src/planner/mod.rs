//! Migration planning
//!
//! Turns a single [`Recommendation`] into an actionable [`MigrationPlan`]:
//! strategy selection, phased steps, risks with mitigations, a downtime
//! estimate and route-specific tooling. Plan generation is pure; the
//! [`MigrationPlanner`] persists plans and drives their status lifecycle.

pub mod downtime;
pub mod lifecycle;
pub mod risks;
pub mod steps;
pub mod strategies;
pub mod tooling;

pub use downtime::DowntimeEstimate;
pub use lifecycle::PlanRecord;
pub use risks::{Mitigation, Risk};
pub use steps::{PlanPhase, PlanStep};
pub use strategies::{MigrationStrategy, StrategyProfile, Timeframe};
pub use tooling::MigrationTool;

use crate::error::Result;
use crate::models::{Level, PlanStatus, Provider, Recommendation};
use crate::observability::AdvisorMetrics;
use crate::store::PlanStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub resource_id: String,
    pub resource_type: String,
    pub current_provider: Provider,
    pub target_provider: Provider,
    pub estimated_savings: f64,
    pub complexity_level: Level,
    pub recommended_strategy: StrategyProfile,
    pub alternative_strategies: Vec<StrategyProfile>,
    pub migration_tooling: Vec<MigrationTool>,
    pub estimated_timeframe: String,
    pub steps: Vec<PlanPhase>,
    pub risks: Vec<Risk>,
    pub mitigations: Vec<Mitigation>,
    pub downtime: DowntimeEstimate,
}

impl MigrationPlan {
    pub fn strategy(&self) -> MigrationStrategy {
        self.recommended_strategy.strategy
    }

    pub fn phase(&self, name: &str) -> Option<&PlanPhase> {
        self.steps.iter().find(|p| p.phase == name)
    }
}

/// Build the plan for one recommendation
pub fn generate_migration_plan(rec: &Recommendation) -> MigrationPlan {
    let strategy = strategies::select_strategy(rec);
    let level = rec.migration_complexity.level;
    let (risks, mitigations) = risks::assess_risks(rec, strategy);

    MigrationPlan {
        resource_id: rec.resource_id.clone(),
        resource_type: rec.resource_type.clone(),
        current_provider: rec.current_provider,
        target_provider: rec.recommended_provider,
        estimated_savings: rec.estimated_savings,
        complexity_level: level,
        recommended_strategy: strategy.profile(),
        alternative_strategies: strategy
            .alternatives()
            .iter()
            .map(|alt| alt.profile())
            .collect(),
        migration_tooling: tooling::select_tooling(
            rec.current_provider,
            rec.recommended_provider,
            rec.resource_kind,
            &rec.resource_type,
        ),
        estimated_timeframe: strategies::estimate_timeframe(strategy.timeframe(), level)
            .to_string(),
        steps: steps::generate_steps(strategy, rec.recommended_provider),
        risks,
        mitigations,
        downtime: downtime::estimate_downtime(rec, strategy),
    }
}

/// Plan generation plus persistence and status tracking
pub struct MigrationPlanner {
    store: Arc<dyn PlanStore>,
    metrics: Option<AdvisorMetrics>,
}

impl MigrationPlanner {
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        Self {
            store,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: AdvisorMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Generate, validate and store a plan
    pub async fn create_plan(
        &self,
        rec: &Recommendation,
        now: DateTime<Utc>,
    ) -> Result<PlanRecord> {
        let plan = generate_migration_plan(rec);
        let record = PlanRecord::new(plan, now)?;
        self.store.insert_plan(record.clone()).await?;

        if let Some(m) = &self.metrics {
            m.inc_plans_generated();
        }
        info!(
            event = "migration_plan_created",
            plan_id = %record.id,
            resource_id = %record.plan.resource_id,
            strategy = %record.plan.strategy(),
            target_provider = %record.plan.target_provider,
            timeframe = %record.plan.estimated_timeframe,
            "Migration plan created"
        );

        Ok(record)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: PlanStatus,
        now: DateTime<Utc>,
    ) -> Result<PlanRecord> {
        let (previous, record) = self.store.transition_plan(id, status, now).await?;

        info!(
            event = "migration_plan_status_changed",
            plan_id = %id,
            from = %previous,
            to = %status,
            "Migration plan status changed"
        );
        Ok(record)
    }

    pub async fn get_plan(&self, id: Uuid) -> Result<PlanRecord> {
        self.store.get_plan(id).await
    }

    pub async fn list_plans(&self) -> Result<Vec<PlanRecord>> {
        self.store.list_plans().await
    }
}
