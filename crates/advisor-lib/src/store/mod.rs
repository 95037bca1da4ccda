//! Persistence collaborators
//!
//! The engine never talks to a database directly. Baselines, metric history,
//! anomalies, opportunities and migration plans go through these traits so
//! the surrounding application can back them with whatever store it runs.
//! [`MemoryStore`] implements all of them in-process.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::PlanStatus;
use crate::monitor::{Anomaly, MetricSnapshot, MetricType, OptimizationOpportunity};
use crate::planner::PlanRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Reference snapshot per metric type; writes are full overwrites
#[async_trait]
pub trait BaselineStore: Send + Sync {
    async fn get_baseline(&self, metric_type: MetricType) -> Result<Option<MetricSnapshot>>;

    async fn set_baseline(&self, snapshot: MetricSnapshot) -> Result<()>;
}

/// Append-only history of collection cycles
#[async_trait]
pub trait MetricStore: Send + Sync {
    async fn append_snapshot(&self, snapshot: MetricSnapshot) -> Result<()>;

    async fn latest_snapshot(&self, metric_type: MetricType) -> Result<Option<MetricSnapshot>>;
}

#[async_trait]
pub trait AnomalyStore: Send + Sync {
    async fn store_anomalies(&self, anomalies: &[Anomaly], metric_type: MetricType) -> Result<()>;

    /// Unacknowledged anomalies in insertion order
    async fn list_active_anomalies(&self) -> Result<Vec<Anomaly>>;

    /// Mark an anomaly acknowledged, returning the updated record
    async fn acknowledge(&self, id: Uuid) -> Result<Anomaly>;
}

#[async_trait]
pub trait OpportunityStore: Send + Sync {
    /// Replace the open and in-progress set; other statuses are kept
    async fn replace_open_opportunities(
        &self,
        opportunities: Vec<OptimizationOpportunity>,
    ) -> Result<()>;

    async fn list_open_opportunities(&self) -> Result<Vec<OptimizationOpportunity>>;
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn insert_plan(&self, record: PlanRecord) -> Result<()>;

    /// Returns `AdvisorError::NotFound` for unknown identifiers
    async fn get_plan(&self, id: Uuid) -> Result<PlanRecord>;

    /// Validate and apply a status change as one step
    ///
    /// Returns the status the plan had before, with the updated record.
    async fn transition_plan(
        &self,
        id: Uuid,
        next: PlanStatus,
        now: DateTime<Utc>,
    ) -> Result<(PlanStatus, PlanRecord)>;

    async fn list_plans(&self) -> Result<Vec<PlanRecord>>;
}
