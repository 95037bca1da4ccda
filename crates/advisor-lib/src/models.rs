//! Core data models for the optimization engine

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Cloud provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Azure,
    Gcp,
}

impl Provider {
    /// Canonical evaluation order; score ties resolve to the earliest entry
    pub const ALL: [Provider; 3] = [Provider::Aws, Provider::Azure, Provider::Gcp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Azure => "azure",
            Provider::Gcp => "gcp",
        }
    }

    /// Upper-case label used in reasoning sentences
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Aws => "AWS",
            Provider::Azure => "AZURE",
            Provider::Gcp => "GCP",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aws" => Ok(Provider::Aws),
            "azure" => Ok(Provider::Azure),
            "gcp" => Ok(Provider::Gcp),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Broad category of a cloud-managed entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[default]
    Instance,
    Database,
    Volume,
    Bucket,
    Function,
}

impl ResourceKind {
    /// Provider-native service name for this kind of resource
    pub fn service_name(&self, provider: Provider) -> &'static str {
        match (provider, self) {
            (Provider::Aws, ResourceKind::Instance) => "EC2",
            (Provider::Aws, ResourceKind::Database) => "RDS",
            (Provider::Aws, ResourceKind::Volume) => "EBS",
            (Provider::Aws, ResourceKind::Bucket) => "S3",
            (Provider::Aws, ResourceKind::Function) => "Lambda",
            (Provider::Azure, ResourceKind::Instance) => "Azure VM",
            (Provider::Azure, ResourceKind::Database) => "Azure SQL",
            (Provider::Azure, ResourceKind::Volume) => "Azure Disk",
            (Provider::Azure, ResourceKind::Bucket) => "Azure Storage",
            (Provider::Azure, ResourceKind::Function) => "Azure Functions",
            (Provider::Gcp, ResourceKind::Instance) => "Compute Engine",
            (Provider::Gcp, ResourceKind::Database) => "Cloud SQL",
            (Provider::Gcp, ResourceKind::Volume) => "Persistent Disk",
            (Provider::Gcp, ResourceKind::Bucket) => "Cloud Storage",
            (Provider::Gcp, ResourceKind::Function) => "Cloud Functions",
        }
    }
}

/// Key/value label attached to a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive substring match against key or value
    pub fn mentions(&self, needle: &str) -> bool {
        self.key.to_lowercase().contains(needle) || self.value.to_lowercase().contains(needle)
    }
}

/// Single metric datapoint observed by the resource collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Metric name, e.g. "cpu"
    pub name: String,
    pub average: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Attached block storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDevice {
    pub device_name: String,
    pub size_gb: u64,
}

/// Immutable snapshot of a cloud-managed entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    /// Instance type, SKU or machine type
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub kind: ResourceKind,
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub metrics: Vec<MetricSample>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub block_devices: Vec<BlockDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub load_balancers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
}

impl Resource {
    pub fn new(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        kind: ResourceKind,
        provider: Provider,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            kind,
            provider,
            region: None,
            metrics: Vec::new(),
            tags: Vec::new(),
            block_devices: Vec::new(),
            timeout_secs: None,
            load_balancers: Vec::new(),
            engine: None,
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_metric(mut self, name: impl Into<String>, average: f64) -> Self {
        self.metrics.push(MetricSample {
            name: name.into(),
            average,
            maximum: None,
            timestamp: None,
        });
        self
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn has_identifier(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Average of all samples for the named metric, if any were collected
    pub fn metric_average(&self, name: &str) -> Option<f64> {
        let samples: Vec<f64> = self
            .metrics
            .iter()
            .filter(|m| m.name.eq_ignore_ascii_case(name))
            .map(|m| m.average)
            .collect();

        if samples.is_empty() {
            None
        } else {
            Some(samples.iter().sum::<f64>() / samples.len() as f64)
        }
    }

    pub fn total_storage_gb(&self) -> u64 {
        self.block_devices.iter().map(|d| d.size_gb).sum()
    }

    pub fn has_tag_mentioning(&self, needle: &str) -> bool {
        self.tags.iter().any(|t| t.mentions(needle))
    }
}

/// Resources grouped by provider, then by resource group (e.g. "ec2", "virtual_machines")
pub type ResourceInventory = BTreeMap<Provider, BTreeMap<String, Vec<Resource>>>;

/// Workload archetype tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Archetype {
    ComputeIntensive,
    StorageIntensive,
    MemoryIntensive,
    Batch,
    RealTime,
    Database,
    Stateless,
    HighAvailability,
    Obsolete,
    Email,
    Crm,
    Collaboration,
    General,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::ComputeIntensive => "compute-intensive",
            Archetype::StorageIntensive => "storage-intensive",
            Archetype::MemoryIntensive => "memory-intensive",
            Archetype::Batch => "batch",
            Archetype::RealTime => "real-time",
            Archetype::Database => "database",
            Archetype::Stateless => "stateless",
            Archetype::HighAvailability => "high-availability",
            Archetype::Obsolete => "obsolete",
            Archetype::Email => "email",
            Archetype::Crm => "crm",
            Archetype::Collaboration => "collaboration",
            Archetype::General => "general",
        }
    }

    /// SaaS-replaceable workloads
    pub fn is_commodity(&self) -> bool {
        matches!(
            self,
            Archetype::Email | Archetype::Crm | Archetype::Collaboration
        )
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regulatory framework marker extracted from tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRequirement {
    pub framework: String,
    pub requirement: String,
}

/// Result of classifying one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadClassification {
    pub resource_id: String,
    pub resource_type: String,
    pub kind: ResourceKind,
    pub provider: Provider,
    /// Matched archetypes in rule-evaluation order
    pub classifications: Vec<Archetype>,
    pub primary_type: Archetype,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compliance: Vec<ComplianceRequirement>,
}

impl WorkloadClassification {
    pub fn has(&self, archetype: Archetype) -> bool {
        self.classifications.contains(&archetype)
    }
}

/// Classifications grouped identically to the inventory they came from
pub type ClassifiedInventory = BTreeMap<Provider, BTreeMap<String, Vec<WorkloadClassification>>>;

/// Three-level bucket used for complexity and risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Migration-complexity assessment attached to every recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationComplexity {
    pub level: Level,
    pub score: f64,
    pub factors: Vec<String>,
}

/// Confidence in a recommendation, 0-100 percent
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(try_from = "String")]
pub struct ConfidenceScore(f64);

impl ConfidenceScore {
    pub const FULL: ConfidenceScore = ConfidenceScore(100.0);

    /// Clamp a percentage into 0-100, rounded to one decimal place
    pub fn from_percent(percent: f64) -> Self {
        let clamped = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self((clamped * 10.0).round() / 10.0)
    }

    pub fn percent(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for ConfidenceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 100.0 {
            write!(f, "100%")
        } else {
            write!(f, "{:.1}%", self.0)
        }
    }
}

impl Serialize for ConfidenceScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl TryFrom<String> for ConfidenceScore {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map(ConfidenceScore::from_percent)
            .map_err(|e| format!("invalid confidence score '{}': {}", value, e))
    }
}

/// Lifecycle of a recommendation, owned by the surrounding application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Implemented,
}

/// Per-resource placement recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub resource_id: String,
    pub resource_type: String,
    #[serde(default)]
    pub resource_kind: ResourceKind,
    pub current_provider: Provider,
    pub recommended_provider: Provider,
    pub current_cost: f64,
    pub estimated_savings: f64,
    pub confidence_score: ConfidenceScore,
    pub reasoning: Vec<String>,
    pub migration_complexity: MigrationComplexity,
    #[serde(default)]
    pub classifications: Vec<Archetype>,
    #[serde(default)]
    pub compliance: Vec<ComplianceRequirement>,
    #[serde(default)]
    pub status: RecommendationStatus,
}

impl Recommendation {
    pub fn recommends_move(&self) -> bool {
        self.recommended_provider != self.current_provider
    }

    pub fn has(&self, archetype: Archetype) -> bool {
        self.classifications.contains(&archetype)
    }
}

/// Lifecycle of a stored migration plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Created,
    InProgress,
    OnHold,
    Completed,
    Failed,
    Cancelled,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Created => "created",
            PlanStatus::InProgress => "in_progress",
            PlanStatus::OnHold => "on_hold",
            PlanStatus::Completed => "completed",
            PlanStatus::Failed => "failed",
            PlanStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlanStatus::Completed | PlanStatus::Failed | PlanStatus::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: PlanStatus) -> bool {
        use PlanStatus::*;
        matches!(
            (self, next),
            (Created, InProgress)
                | (Created, OnHold)
                | (Created, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (InProgress, OnHold)
                | (InProgress, Cancelled)
                | (OnHold, InProgress)
                | (OnHold, Cancelled)
        )
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(PlanStatus::Created),
            "in_progress" => Ok(PlanStatus::InProgress),
            "on_hold" => Ok(PlanStatus::OnHold),
            "completed" => Ok(PlanStatus::Completed),
            "failed" => Ok(PlanStatus::Failed),
            "cancelled" => Ok(PlanStatus::Cancelled),
            other => Err(format!("invalid plan status '{}'", other)),
        }
    }
}

/// Round a currency amount to cents
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_score_formatting() {
        assert_eq!(ConfidenceScore::FULL.to_string(), "100%");
        assert_eq!(ConfidenceScore::from_percent(12.345).to_string(), "12.3%");
        assert_eq!(ConfidenceScore::from_percent(250.0).to_string(), "100%");
        assert_eq!(
            serde_json::to_string(&ConfidenceScore::from_percent(42.0)).unwrap(),
            "\"42.0%\""
        );
    }

    #[test]
    fn test_confidence_score_parse() {
        let score: ConfidenceScore = serde_json::from_str("\"13.4%\"").unwrap();
        assert!((score.percent() - 13.4).abs() < 1e-9);
        assert!(serde_json::from_str::<ConfidenceScore>("\"abc\"").is_err());
    }

    #[test]
    fn test_resource_requires_provider() {
        let missing = r#"{"id": "i-1", "resource_type": "t2.micro"}"#;
        assert!(serde_json::from_str::<Resource>(missing).is_err());

        let present = r#"{"id": "i-1", "resource_type": "t2.micro", "provider": "aws"}"#;
        let resource: Resource = serde_json::from_str(present).unwrap();
        assert_eq!(resource.provider, Provider::Aws);
        assert_eq!(resource.kind, ResourceKind::Instance);
    }

    #[test]
    fn test_metric_average() {
        let resource = Resource::new("i-1", "m5.large", ResourceKind::Instance, Provider::Aws)
            .with_metric("cpu", 60.0)
            .with_metric("CPU", 80.0)
            .with_metric("memory", 10.0);

        assert_eq!(resource.metric_average("cpu"), Some(70.0));
        assert_eq!(resource.metric_average("network"), None);
    }

    #[test]
    fn test_plan_status_transitions() {
        assert!(PlanStatus::Created.can_transition_to(PlanStatus::InProgress));
        assert!(PlanStatus::InProgress.can_transition_to(PlanStatus::Completed));
        assert!(PlanStatus::OnHold.can_transition_to(PlanStatus::InProgress));
        assert!(!PlanStatus::Completed.can_transition_to(PlanStatus::InProgress));
        assert!(!PlanStatus::Created.can_transition_to(PlanStatus::Completed));
        assert!(PlanStatus::Cancelled.is_terminal());
        assert_eq!("on_hold".parse::<PlanStatus>().unwrap(), PlanStatus::OnHold);
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(8.468), 8.47);
        assert_eq!(round_cents(0.0), 0.0);
    }
}
