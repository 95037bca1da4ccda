//! Telemetry snapshots, anomalies and optimization opportunities

use crate::models::{Provider, ResourceKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Cost,
    Performance,
    Utilization,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Cost => "cost",
            MetricType::Performance => "performance",
            MetricType::Utilization => "utilization",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCost {
    pub date: NaiveDate,
    pub cost: f64,
    #[serde(default = "default_currency")]
    pub unit: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Billing data for one provider over the collection window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostMetrics {
    pub total_cost: f64,
    #[serde(default)]
    pub daily_costs: Vec<DailyCost>,
    /// Service name -> cost over the window
    #[serde(default)]
    pub service_breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationStat {
    pub average: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstancePerformance {
    pub instance_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<UtilizationStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<UtilizationStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(default)]
    pub compute: Vec<InstancePerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceUtilization {
    pub instance_id: String,
    pub instance_type: String,
    /// Average CPU percent over the last 7 days
    pub cpu_utilization: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeUtilization {
    pub volume_id: String,
    pub volume_type: String,
    pub size_gb: u64,
    #[serde(default)]
    pub attachments: u32,
}

impl VolumeUtilization {
    pub fn is_unattached(&self) -> bool {
        self.attachments == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilizationMetrics {
    #[serde(default)]
    pub instances: Vec<InstanceUtilization>,
    #[serde(default)]
    pub volumes: Vec<VolumeUtilization>,
}

/// One collection cycle's payload for every provider that reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSnapshot<T> {
    pub collected_at: DateTime<Utc>,
    pub providers: BTreeMap<Provider, T>,
}

impl<T> ProviderSnapshot<T> {
    pub fn new(collected_at: DateTime<Utc>) -> Self {
        Self {
            collected_at,
            providers: BTreeMap::new(),
        }
    }

    pub fn with_provider(mut self, provider: Provider, data: T) -> Self {
        self.providers.insert(provider, data);
        self
    }
}

pub type CostSnapshot = ProviderSnapshot<CostMetrics>;
pub type PerformanceSnapshot = ProviderSnapshot<PerformanceMetrics>;
pub type UtilizationSnapshot = ProviderSnapshot<UtilizationMetrics>;

/// Timestamped, append-only record of one collection cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric_type", rename_all = "snake_case")]
pub enum MetricSnapshot {
    Cost(CostSnapshot),
    Performance(PerformanceSnapshot),
    Utilization(UtilizationSnapshot),
}

impl MetricSnapshot {
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricSnapshot::Cost(_) => MetricType::Cost,
            MetricSnapshot::Performance(_) => MetricType::Performance,
            MetricSnapshot::Utilization(_) => MetricType::Utilization,
        }
    }

    pub fn collected_at(&self) -> DateTime<Utc> {
        match self {
            MetricSnapshot::Cost(s) => s.collected_at,
            MetricSnapshot::Performance(s) => s.collected_at,
            MetricSnapshot::Utilization(s) => s.collected_at,
        }
    }

    pub fn provider_count(&self) -> usize {
        match self {
            MetricSnapshot::Cost(s) => s.providers.len(),
            MetricSnapshot::Performance(s) => s.providers.len(),
            MetricSnapshot::Utilization(s) => s.providers.len(),
        }
    }
}

/// Severity and priority scale, ordered for alert sorting (high first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    TotalCostIncrease,
    ServiceCostIncrease,
    HighCpuUtilization,
    HighMemoryUtilization,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyKind::TotalCostIncrease => write!(f, "total_cost_increase"),
            AnomalyKind::ServiceCostIncrease => write!(f, "service_cost_increase"),
            AnomalyKind::HighCpuUtilization => write!(f, "high_cpu_utilization"),
            AnomalyKind::HighMemoryUtilization => write!(f, "high_memory_utilization"),
        }
    }
}

/// Deviation of a metric from its baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: Uuid,
    pub provider: Provider,
    pub metric_type: MetricType,
    pub kind: AnomalyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub baseline: f64,
    pub current: f64,
    pub percentage_increase: f64,
    pub severity: Severity,
    pub detected_at: DateTime<Utc>,
    #[serde(default)]
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityAction {
    Terminate,
    Downsize,
    Delete,
}

impl fmt::Display for OpportunityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpportunityAction::Terminate => write!(f, "terminate"),
            OpportunityAction::Downsize => write!(f, "downsize"),
            OpportunityAction::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    #[default]
    Open,
    InProgress,
    Implemented,
    Dismissed,
}

impl OpportunityStatus {
    /// Member of the set replaced on every analysis cycle
    pub fn is_active(&self) -> bool {
        matches!(self, OpportunityStatus::Open | OpportunityStatus::InProgress)
    }
}

/// Detected waste pattern with an estimated monthly saving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOpportunity {
    pub provider: Provider,
    pub resource_kind: ResourceKind,
    /// Provider-native service label, e.g. "EC2"
    pub service: String,
    pub resource_id: String,
    pub action: OpportunityAction,
    pub description: String,
    pub potential_savings: f64,
    pub priority: Severity,
    #[serde(default)]
    pub status: OpportunityStatus,
    pub detected_at: DateTime<Utc>,
}

impl OptimizationOpportunity {
    /// Stable identity across analysis cycles
    pub fn key(&self) -> (Provider, String, OpportunityAction) {
        (self.provider, self.resource_id.clone(), self.action)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SavingsBucket {
    pub count: usize,
    pub potential_savings: f64,
}

/// Open opportunities aggregated by provider and by action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub total_opportunities: usize,
    pub total_potential_savings: f64,
    pub by_provider: BTreeMap<Provider, SavingsBucket>,
    pub by_action: BTreeMap<OpportunityAction, SavingsBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_tagging() {
        let snapshot = MetricSnapshot::Cost(CostSnapshot::new(Utc::now()).with_provider(
            Provider::Aws,
            CostMetrics {
                total_cost: 120.0,
                ..Default::default()
            },
        ));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["metric_type"], "cost");
        assert_eq!(json["providers"]["aws"]["total_cost"], 120.0);

        let back: MetricSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back.metric_type(), MetricType::Cost);
        assert_eq!(back.provider_count(), 1);
    }

    #[test]
    fn test_severity_orders_high_first() {
        let mut severities = vec![Severity::Low, Severity::High, Severity::Medium];
        severities.sort();
        assert_eq!(severities, vec![Severity::High, Severity::Medium, Severity::Low]);
    }
}
