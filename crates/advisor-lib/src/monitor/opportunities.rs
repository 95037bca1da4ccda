//! Waste detection over utilization snapshots

use super::types::{
    InstanceUtilization, OpportunityAction, OpportunityStatus, OptimizationOpportunity,
    OptimizationSummary, Severity, UtilizationSnapshot, VolumeUtilization,
};
use crate::models::{Provider, ResourceKind};
use crate::pricing::reference_price;
use chrono::{DateTime, Utc};

/// Average CPU percent below which an instance is an opportunity
pub const LOW_UTILIZATION_PERCENT: f64 = 10.0;

/// Average CPU percent below which termination is suggested over downsizing
pub const IDLE_UTILIZATION_PERCENT: f64 = 5.0;

/// Upper bound of the reserve tier in the savings heuristic
pub const MODERATE_UTILIZATION_PERCENT: f64 = 20.0;

/// Hourly instance price scaled to a monthly figure
const MONTHLY_MULTIPLIER: f64 = 30.0;

pub const DEFAULT_INSTANCE_PRICE: f64 = 0.10;
pub const DEFAULT_VOLUME_GB_PRICE: f64 = 0.10;

const HIGH_PRIORITY_INSTANCE_SAVINGS: f64 = 50.0;
const HIGH_PRIORITY_VOLUME_SAVINGS: f64 = 20.0;

/// Catalogue on-demand price, or the default for types it does not list
pub fn instance_hourly_price(provider: Provider, instance_type: &str) -> f64 {
    reference_price(provider, instance_type).unwrap_or(DEFAULT_INSTANCE_PRICE)
}

/// Monthly price per GB for a volume type
pub fn volume_gb_price(volume_type: &str) -> f64 {
    match volume_type {
        "gp2" => 0.10,
        "io1" => 0.125,
        "st1" => 0.045,
        "sc1" => 0.025,
        _ => DEFAULT_VOLUME_GB_PRICE,
    }
}

/// Recoverable monthly spend for an instance at the given CPU percent
///
/// Under 5% the full monthly cost, under 10% half of it, under 20% the
/// 30% a reservation would save; otherwise nothing.
pub fn potential_savings(provider: Provider, instance_type: &str, cpu_utilization: f64) -> f64 {
    let hourly = instance_hourly_price(provider, instance_type);
    if cpu_utilization < IDLE_UTILIZATION_PERCENT {
        hourly * MONTHLY_MULTIPLIER
    } else if cpu_utilization < LOW_UTILIZATION_PERCENT {
        hourly * 0.5 * MONTHLY_MULTIPLIER
    } else if cpu_utilization < MODERATE_UTILIZATION_PERCENT {
        hourly * 0.3 * MONTHLY_MULTIPLIER
    } else {
        0.0
    }
}

pub fn volume_savings(volume: &VolumeUtilization) -> f64 {
    volume.size_gb as f64 * volume_gb_price(&volume.volume_type)
}

fn instance_opportunity(
    provider: Provider,
    instance: &InstanceUtilization,
    detected_at: DateTime<Utc>,
) -> Option<OptimizationOpportunity> {
    let cpu = instance.cpu_utilization;
    if cpu >= LOW_UTILIZATION_PERCENT {
        return None;
    }

    let (action, description) = if cpu < IDLE_UTILIZATION_PERCENT {
        (
            OpportunityAction::Terminate,
            format!(
                "Instance has very low utilization ({:.2}%). Consider terminating.",
                cpu
            ),
        )
    } else {
        (
            OpportunityAction::Downsize,
            format!(
                "Instance has low utilization ({:.2}%). Consider downsizing.",
                cpu
            ),
        )
    };
    let savings = potential_savings(provider, &instance.instance_type, cpu);

    Some(OptimizationOpportunity {
        provider,
        resource_kind: ResourceKind::Instance,
        service: ResourceKind::Instance.service_name(provider).to_string(),
        resource_id: instance.instance_id.clone(),
        action,
        description,
        potential_savings: savings,
        priority: if savings > HIGH_PRIORITY_INSTANCE_SAVINGS {
            Severity::High
        } else {
            Severity::Medium
        },
        status: OpportunityStatus::Open,
        detected_at,
    })
}

fn volume_opportunity(
    provider: Provider,
    volume: &VolumeUtilization,
    detected_at: DateTime<Utc>,
) -> Option<OptimizationOpportunity> {
    if !volume.is_unattached() {
        return None;
    }

    let savings = volume_savings(volume);
    Some(OptimizationOpportunity {
        provider,
        resource_kind: ResourceKind::Volume,
        service: ResourceKind::Volume.service_name(provider).to_string(),
        resource_id: volume.volume_id.clone(),
        action: OpportunityAction::Delete,
        description: "Volume is not attached to any instance. Consider deleting if not needed."
            .to_string(),
        potential_savings: savings,
        priority: if savings > HIGH_PRIORITY_VOLUME_SAVINGS {
            Severity::High
        } else {
            Severity::Medium
        },
        status: OpportunityStatus::Open,
        detected_at,
    })
}

/// Low-utilization instances and unattached volumes across all providers
///
/// Deterministic for a given snapshot: opportunities carry the snapshot's
/// collection time and no generated identifiers.
pub fn find_optimization_opportunities(
    snapshot: &UtilizationSnapshot,
) -> Vec<OptimizationOpportunity> {
    let detected_at = snapshot.collected_at;
    let mut opportunities = Vec::new();

    for (provider, metrics) in &snapshot.providers {
        opportunities.extend(
            metrics
                .instances
                .iter()
                .filter_map(|i| instance_opportunity(*provider, i, detected_at)),
        );
        opportunities.extend(
            metrics
                .volumes
                .iter()
                .filter_map(|v| volume_opportunity(*provider, v, detected_at)),
        );
    }

    opportunities
}

/// Aggregate active opportunities by provider and by action
pub fn summarize(opportunities: &[OptimizationOpportunity]) -> OptimizationSummary {
    let mut summary = OptimizationSummary::default();

    for opp in opportunities.iter().filter(|o| o.status.is_active()) {
        summary.total_opportunities += 1;
        summary.total_potential_savings += opp.potential_savings;

        let by_provider = summary.by_provider.entry(opp.provider).or_default();
        by_provider.count += 1;
        by_provider.potential_savings += opp.potential_savings;

        let by_action = summary.by_action.entry(opp.action).or_default();
        by_action.count += 1;
        by_action.potential_savings += opp.potential_savings;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::types::UtilizationMetrics;

    fn instance(id: &str, ty: &str, cpu: f64) -> InstanceUtilization {
        InstanceUtilization {
            instance_id: id.to_string(),
            instance_type: ty.to_string(),
            cpu_utilization: cpu,
            state: Some("running".to_string()),
        }
    }

    fn volume(id: &str, ty: &str, size_gb: u64, attachments: u32) -> VolumeUtilization {
        VolumeUtilization {
            volume_id: id.to_string(),
            volume_type: ty.to_string(),
            size_gb,
            attachments,
        }
    }

    fn snapshot() -> UtilizationSnapshot {
        UtilizationSnapshot::new(Utc::now()).with_provider(
            Provider::Aws,
            UtilizationMetrics {
                instances: vec![
                    instance("i-idle", "t2.micro", 3.0),
                    instance("i-low", "m5.xlarge", 7.5),
                    instance("i-busy", "c5.large", 45.0),
                ],
                volumes: vec![
                    volume("vol-free", "io1", 200, 0),
                    volume("vol-used", "gp2", 100, 1),
                ],
            },
        )
    }

    #[test]
    fn test_idle_instance_is_terminate_at_full_monthly_cost() {
        let opps = find_optimization_opportunities(&snapshot());
        let idle = opps.iter().find(|o| o.resource_id == "i-idle").unwrap();

        assert_eq!(idle.action, OpportunityAction::Terminate);
        assert_eq!(idle.potential_savings, 0.0116 * 30.0);
        assert_eq!(idle.priority, Severity::Medium);
        assert_eq!(idle.service, "EC2");
        assert_eq!(
            idle.description,
            "Instance has very low utilization (3.00%). Consider terminating."
        );
    }

    #[test]
    fn test_low_instance_is_downsize() {
        let opps = find_optimization_opportunities(&snapshot());
        let low = opps.iter().find(|o| o.resource_id == "i-low").unwrap();
        assert_eq!(low.action, OpportunityAction::Downsize);
        assert!((low.potential_savings - 2.88).abs() < 1e-9);
        assert!(opps.iter().all(|o| o.resource_id != "i-busy"));
    }

    #[test]
    fn test_unattached_volume() {
        let opps = find_optimization_opportunities(&snapshot());
        let vol = opps.iter().find(|o| o.resource_id == "vol-free").unwrap();
        assert_eq!(vol.action, OpportunityAction::Delete);
        assert_eq!(vol.potential_savings, 25.0);
        assert_eq!(vol.priority, Severity::High);
        assert!(opps.iter().all(|o| o.resource_id != "vol-used"));
    }

    #[test]
    fn test_detection_is_idempotent() {
        let snap = snapshot();
        assert_eq!(
            find_optimization_opportunities(&snap),
            find_optimization_opportunities(&snap)
        );
    }

    #[test]
    fn test_savings_tiers() {
        assert!((potential_savings(Provider::Aws, "unknown", 1.0) - 3.0).abs() < 1e-9);
        assert!((potential_savings(Provider::Aws, "unknown", 15.0) - 0.9).abs() < 1e-9);
        assert_eq!(potential_savings(Provider::Aws, "unknown", 20.0), 0.0);
    }

    #[test]
    fn test_instance_price_comes_from_catalogue() {
        assert_eq!(instance_hourly_price(Provider::Gcp, "e2-micro"), 0.0084);
        assert_eq!(instance_hourly_price(Provider::Azure, "Standard_B1s"), 0.0104);
        assert_eq!(
            instance_hourly_price(Provider::Gcp, "t2.micro"),
            DEFAULT_INSTANCE_PRICE
        );
    }

    #[test]
    fn test_summary_groups_active_only() {
        let mut opps = find_optimization_opportunities(&snapshot());
        opps[0].status = OpportunityStatus::Dismissed;

        let summary = summarize(&opps);
        assert_eq!(summary.total_opportunities, 2);
        assert_eq!(summary.by_provider[&Provider::Aws].count, 2);
        assert!(!summary.by_action.contains_key(&OpportunityAction::Terminate));
    }
}
