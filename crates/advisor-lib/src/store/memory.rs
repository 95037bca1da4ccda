//! In-process store

use super::{AnomalyStore, BaselineStore, MetricStore, OpportunityStore, PlanStore};
use crate::error::{AdvisorError, Result};
use crate::models::PlanStatus;
use crate::monitor::{Anomaly, MetricSnapshot, MetricType, OptimizationOpportunity};
use crate::planner::PlanRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Snapshots kept per metric type before the oldest are dropped
const DEFAULT_HISTORY_LIMIT: usize = 500;

/// Anomalies kept before acknowledged, then oldest, entries are dropped
const DEFAULT_ANOMALY_LIMIT: usize = 500;

/// Store backed by process memory; contents are lost on restart
pub struct MemoryStore {
    baselines: DashMap<MetricType, MetricSnapshot>,
    history: RwLock<Vec<MetricSnapshot>>,
    history_limit: usize,
    anomalies: RwLock<Vec<Anomaly>>,
    anomaly_limit: usize,
    opportunities: RwLock<Vec<OptimizationOpportunity>>,
    plans: DashMap<Uuid, PlanRecord>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            baselines: DashMap::new(),
            history: RwLock::new(Vec::new()),
            history_limit: DEFAULT_HISTORY_LIMIT,
            anomalies: RwLock::new(Vec::new()),
            anomaly_limit: DEFAULT_ANOMALY_LIMIT,
            opportunities: RwLock::new(Vec::new()),
            plans: DashMap::new(),
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn with_anomaly_limit(mut self, limit: usize) -> Self {
        self.anomaly_limit = limit.max(1);
        self
    }

    pub async fn anomaly_count(&self) -> usize {
        self.anomalies.read().await.len()
    }

    /// All stored opportunities regardless of status
    pub async fn all_opportunities(&self) -> Vec<OptimizationOpportunity> {
        self.opportunities.read().await.clone()
    }

    pub async fn snapshot_count(&self, metric_type: MetricType) -> usize {
        self.history
            .read()
            .await
            .iter()
            .filter(|s| s.metric_type() == metric_type)
            .count()
    }
}

#[async_trait]
impl BaselineStore for MemoryStore {
    async fn get_baseline(&self, metric_type: MetricType) -> Result<Option<MetricSnapshot>> {
        Ok(self.baselines.get(&metric_type).map(|b| b.value().clone()))
    }

    async fn set_baseline(&self, snapshot: MetricSnapshot) -> Result<()> {
        self.baselines.insert(snapshot.metric_type(), snapshot);
        Ok(())
    }
}

#[async_trait]
impl MetricStore for MemoryStore {
    async fn append_snapshot(&self, snapshot: MetricSnapshot) -> Result<()> {
        let metric_type = snapshot.metric_type();
        let mut history = self.history.write().await;
        history.push(snapshot);

        let count = history
            .iter()
            .filter(|s| s.metric_type() == metric_type)
            .count();
        if count > self.history_limit {
            if let Some(oldest) = history.iter().position(|s| s.metric_type() == metric_type) {
                history.remove(oldest);
            }
        }
        Ok(())
    }

    async fn latest_snapshot(&self, metric_type: MetricType) -> Result<Option<MetricSnapshot>> {
        Ok(self
            .history
            .read()
            .await
            .iter()
            .rev()
            .find(|s| s.metric_type() == metric_type)
            .cloned())
    }
}

#[async_trait]
impl AnomalyStore for MemoryStore {
    async fn store_anomalies(&self, anomalies: &[Anomaly], metric_type: MetricType) -> Result<()> {
        if let Some(stray) = anomalies.iter().find(|a| a.metric_type != metric_type) {
            return Err(AdvisorError::Store(format!(
                "anomaly {} has metric type {}, expected {}",
                stray.id, stray.metric_type, metric_type
            )));
        }
        let mut stored = self.anomalies.write().await;
        stored.extend_from_slice(anomalies);
        if stored.len() > self.anomaly_limit {
            stored.retain(|a| !a.acknowledged);
        }
        if stored.len() > self.anomaly_limit {
            let excess = stored.len() - self.anomaly_limit;
            stored.drain(..excess);
        }
        Ok(())
    }

    async fn list_active_anomalies(&self) -> Result<Vec<Anomaly>> {
        Ok(self
            .anomalies
            .read()
            .await
            .iter()
            .filter(|a| !a.acknowledged)
            .cloned()
            .collect())
    }

    async fn acknowledge(&self, id: Uuid) -> Result<Anomaly> {
        let mut anomalies = self.anomalies.write().await;
        let anomaly = anomalies
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AdvisorError::NotFound(format!("anomaly {}", id)))?;
        anomaly.acknowledged = true;
        Ok(anomaly.clone())
    }
}

#[async_trait]
impl OpportunityStore for MemoryStore {
    async fn replace_open_opportunities(
        &self,
        opportunities: Vec<OptimizationOpportunity>,
    ) -> Result<()> {
        let mut stored = self.opportunities.write().await;
        stored.retain(|o| !o.status.is_active());
        stored.extend(opportunities);
        Ok(())
    }

    async fn list_open_opportunities(&self) -> Result<Vec<OptimizationOpportunity>> {
        Ok(self
            .opportunities
            .read()
            .await
            .iter()
            .filter(|o| o.status.is_active())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn insert_plan(&self, record: PlanRecord) -> Result<()> {
        self.plans.insert(record.id, record);
        Ok(())
    }

    async fn get_plan(&self, id: Uuid) -> Result<PlanRecord> {
        self.plans
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or_else(|| AdvisorError::NotFound(format!("migration plan {}", id)))
    }

    async fn transition_plan(
        &self,
        id: Uuid,
        next: PlanStatus,
        now: DateTime<Utc>,
    ) -> Result<(PlanStatus, PlanRecord)> {
        // the shard stays write-locked between check and write
        let mut record = self
            .plans
            .get_mut(&id)
            .ok_or_else(|| AdvisorError::NotFound(format!("migration plan {}", id)))?;
        let previous = record.status;
        record.transition(next, now)?;
        Ok((previous, record.clone()))
    }

    async fn list_plans(&self) -> Result<Vec<PlanRecord>> {
        let mut plans: Vec<PlanRecord> = self.plans.iter().map(|r| r.value().clone()).collect();
        plans.sort_by_key(|p| p.created_at);
        Ok(plans)
    }
}
