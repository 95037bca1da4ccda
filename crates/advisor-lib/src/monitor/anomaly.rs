//! Baseline comparison for cost and performance snapshots
//!
//! Detection is a pure function of (current, baseline). Anomalies are
//! stamped with the current snapshot's collection time.

use super::types::{
    Anomaly, AnomalyKind, CostMetrics, CostSnapshot, MetricType, PerformanceMetrics,
    PerformanceSnapshot, Severity, UtilizationStat,
};
use crate::models::Provider;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Relative cost increase over baseline that raises an anomaly
pub const COST_INCREASE_THRESHOLD: f64 = 0.15;

/// Relative CPU or memory increase over baseline that raises an anomaly
pub const PERFORMANCE_DEGRADATION_THRESHOLD: f64 = 0.25;

/// Services cheaper than this in the baseline are never flagged
pub const SERVICE_COST_FLOOR: f64 = 10.0;

/// Current service cost above which a service anomaly is high severity
pub const HIGH_SERVICE_COST: f64 = 100.0;

/// Utilization percent above which a performance anomaly is high severity
pub const HIGH_UTILIZATION_PERCENT: f64 = 90.0;

fn percentage_increase(baseline: f64, current: f64) -> f64 {
    ((current - baseline) / baseline * 10_000.0).round() / 100.0
}

fn exceeds(baseline: f64, current: f64, threshold: f64) -> bool {
    baseline > 0.0 && current > baseline * (1.0 + threshold)
}

struct Observation<'a> {
    provider: Provider,
    metric_type: MetricType,
    kind: AnomalyKind,
    service: Option<&'a str>,
    resource_id: Option<&'a str>,
    baseline: f64,
    current: f64,
    severity: Severity,
}

impl Observation<'_> {
    fn into_anomaly(self, detected_at: DateTime<Utc>) -> Anomaly {
        Anomaly {
            id: Uuid::new_v4(),
            provider: self.provider,
            metric_type: self.metric_type,
            kind: self.kind,
            service: self.service.map(str::to_string),
            resource_id: self.resource_id.map(str::to_string),
            baseline: self.baseline,
            current: self.current,
            percentage_increase: percentage_increase(self.baseline, self.current),
            severity: self.severity,
            detected_at,
            acknowledged: false,
        }
    }
}

/// Compare one provider's cost metrics against its baseline
pub fn detect_cost_anomalies(
    provider: Provider,
    current: &CostMetrics,
    baseline: &CostMetrics,
    detected_at: DateTime<Utc>,
) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    if exceeds(baseline.total_cost, current.total_cost, COST_INCREASE_THRESHOLD) {
        anomalies.push(
            Observation {
                provider,
                metric_type: MetricType::Cost,
                kind: AnomalyKind::TotalCostIncrease,
                service: None,
                resource_id: None,
                baseline: baseline.total_cost,
                current: current.total_cost,
                severity: Severity::High,
            }
            .into_anomaly(detected_at),
        );
    }

    for (service, &current_cost) in &current.service_breakdown {
        let baseline_cost = baseline
            .service_breakdown
            .get(service)
            .copied()
            .unwrap_or(0.0);

        if baseline_cost > SERVICE_COST_FLOOR
            && exceeds(baseline_cost, current_cost, COST_INCREASE_THRESHOLD)
        {
            let severity = if current_cost > HIGH_SERVICE_COST {
                Severity::High
            } else {
                Severity::Medium
            };
            anomalies.push(
                Observation {
                    provider,
                    metric_type: MetricType::Cost,
                    kind: AnomalyKind::ServiceCostIncrease,
                    service: Some(service.as_str()),
                    resource_id: None,
                    baseline: baseline_cost,
                    current: current_cost,
                    severity,
                }
                .into_anomaly(detected_at),
            );
        }
    }

    anomalies
}

fn utilization_anomaly<'a>(
    provider: Provider,
    kind: AnomalyKind,
    instance_id: &'a str,
    current: Option<&UtilizationStat>,
    baseline: Option<&UtilizationStat>,
) -> Option<Observation<'a>> {
    let (current, baseline) = (current?.average, baseline?.average);
    if !exceeds(baseline, current, PERFORMANCE_DEGRADATION_THRESHOLD) {
        return None;
    }

    Some(Observation {
        provider,
        metric_type: MetricType::Performance,
        kind,
        service: None,
        resource_id: Some(instance_id),
        baseline,
        current,
        severity: if current > HIGH_UTILIZATION_PERCENT {
            Severity::High
        } else {
            Severity::Medium
        },
    })
}

/// Compare one provider's per-instance CPU and memory against the baseline
///
/// Instances are matched by identifier; instances absent from the baseline
/// are ignored.
pub fn detect_performance_anomalies(
    provider: Provider,
    current: &PerformanceMetrics,
    baseline: &PerformanceMetrics,
    detected_at: DateTime<Utc>,
) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for instance in &current.compute {
        let Some(base) = baseline
            .compute
            .iter()
            .find(|b| b.instance_id == instance.instance_id)
        else {
            continue;
        };

        let checks = [
            (
                AnomalyKind::HighCpuUtilization,
                instance.cpu.as_ref(),
                base.cpu.as_ref(),
            ),
            (
                AnomalyKind::HighMemoryUtilization,
                instance.memory.as_ref(),
                base.memory.as_ref(),
            ),
        ];

        for (kind, current_stat, baseline_stat) in checks {
            if let Some(obs) = utilization_anomaly(
                provider,
                kind,
                &instance.instance_id,
                current_stat,
                baseline_stat,
            ) {
                anomalies.push(obs.into_anomaly(detected_at));
            }
        }
    }

    anomalies
}

/// Compare providers present in both snapshots
pub fn compare_cost_snapshots(current: &CostSnapshot, baseline: &CostSnapshot) -> Vec<Anomaly> {
    current
        .providers
        .iter()
        .filter_map(|(provider, metrics)| {
            baseline
                .providers
                .get(provider)
                .map(|base| detect_cost_anomalies(*provider, metrics, base, current.collected_at))
        })
        .flatten()
        .collect()
}

pub fn compare_performance_snapshots(
    current: &PerformanceSnapshot,
    baseline: &PerformanceSnapshot,
) -> Vec<Anomaly> {
    current
        .providers
        .iter()
        .filter_map(|(provider, metrics)| {
            baseline.providers.get(provider).map(|base| {
                detect_performance_anomalies(*provider, metrics, base, current.collected_at)
            })
        })
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::types::InstancePerformance;
    use std::collections::BTreeMap;

    fn costs(total: f64, services: &[(&str, f64)]) -> CostMetrics {
        CostMetrics {
            total_cost: total,
            daily_costs: vec![],
            service_breakdown: services
                .iter()
                .map(|(s, c)| (s.to_string(), *c))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn instance(id: &str, cpu: f64, memory: Option<f64>) -> InstancePerformance {
        InstancePerformance {
            instance_id: id.to_string(),
            cpu: Some(UtilizationStat {
                average: cpu,
                maximum: None,
            }),
            memory: memory.map(|m| UtilizationStat {
                average: m,
                maximum: None,
            }),
        }
    }

    #[test]
    fn test_total_cost_increase_is_high() {
        let anomalies = detect_cost_anomalies(
            Provider::Aws,
            &costs(120.0, &[]),
            &costs(100.0, &[]),
            Utc::now(),
        );
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::TotalCostIncrease);
        assert_eq!(anomalies[0].severity, Severity::High);
        assert_eq!(anomalies[0].percentage_increase, 20.0);
    }

    #[test]
    fn test_increase_at_threshold_is_not_anomalous() {
        let anomalies = detect_cost_anomalies(
            Provider::Aws,
            &costs(114.0, &[]),
            &costs(100.0, &[]),
            Utc::now(),
        );
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_service_floor_and_severity() {
        let current = costs(
            100.0,
            &[("EC2", 150.0), ("S3", 9.0), ("Lambda", 30.0), ("New", 500.0)],
        );
        let baseline = costs(100.0, &[("EC2", 100.0), ("S3", 5.0), ("Lambda", 20.0)]);

        let anomalies = detect_cost_anomalies(Provider::Aws, &current, &baseline, Utc::now());
        let services: Vec<(&str, Severity)> = anomalies
            .iter()
            .map(|a| (a.service.as_deref().unwrap(), a.severity))
            .collect();

        // BTreeMap order; S3 below the floor; New has no baseline
        assert_eq!(
            services,
            vec![("EC2", Severity::High), ("Lambda", Severity::Medium)]
        );
    }

    #[test]
    fn test_performance_matched_by_instance() {
        let current = PerformanceMetrics {
            compute: vec![
                instance("i-1", 95.0, Some(50.0)),
                instance("i-2", 60.0, Some(80.0)),
                instance("i-new", 99.0, None),
            ],
        };
        let baseline = PerformanceMetrics {
            compute: vec![instance("i-1", 70.0, Some(45.0)), instance("i-2", 40.0, None)],
        };

        let anomalies =
            detect_performance_anomalies(Provider::Gcp, &current, &baseline, Utc::now());
        assert_eq!(anomalies.len(), 2);

        assert_eq!(anomalies[0].resource_id.as_deref(), Some("i-1"));
        assert_eq!(anomalies[0].kind, AnomalyKind::HighCpuUtilization);
        assert_eq!(anomalies[0].severity, Severity::High);

        assert_eq!(anomalies[1].resource_id.as_deref(), Some("i-2"));
        assert_eq!(anomalies[1].severity, Severity::Medium);
    }

    #[test]
    fn test_zero_baseline_never_fires() {
        let current = PerformanceMetrics {
            compute: vec![instance("i-1", 50.0, None)],
        };
        let baseline = PerformanceMetrics {
            compute: vec![instance("i-1", 0.0, None)],
        };
        assert!(
            detect_performance_anomalies(Provider::Aws, &current, &baseline, Utc::now()).is_empty()
        );
    }

    #[test]
    fn test_snapshot_comparison_skips_missing_providers() {
        let now = Utc::now();
        let current = CostSnapshot::new(now)
            .with_provider(Provider::Aws, costs(200.0, &[]))
            .with_provider(Provider::Azure, costs(200.0, &[]));
        let baseline = CostSnapshot::new(now).with_provider(Provider::Aws, costs(100.0, &[]));

        let anomalies = compare_cost_snapshots(&current, &baseline);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].provider, Provider::Aws);
        assert_eq!(anomalies[0].detected_at, now);
    }
}
