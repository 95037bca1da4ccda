//! In-memory active alert list
//!
//! Handles:
//! - Appending newly detected anomalies as unacknowledged alerts
//! - Severity-ordered retrieval of unacknowledged alerts
//! - Suppressing repeat notifications within a deduplication window
//!
//! Acknowledged alerts are dropped, and the list is capped so the oldest
//! unacknowledged alerts fall off first.

use super::types::{Anomaly, AnomalyKind};
use crate::models::Provider;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Default notification deduplication window (15 minutes)
const DEFAULT_DEDUP_WINDOW_MINUTES: i64 = 15;

/// Unacknowledged alerts kept before the oldest are dropped
const DEFAULT_ALERT_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    provider: Provider,
    kind: AnomalyKind,
    target: Option<String>,
}

impl DedupKey {
    fn of(anomaly: &Anomaly) -> Self {
        Self {
            provider: anomaly.provider,
            kind: anomaly.kind,
            target: anomaly
                .service
                .clone()
                .or_else(|| anomaly.resource_id.clone()),
        }
    }
}

/// Active alerts owned by one monitor instance
pub struct ActiveAlerts {
    alerts: RwLock<Vec<Anomaly>>,
    limit: usize,
    dedup_window: Duration,
    /// key -> detection time of the last notified alert
    last_notified: RwLock<HashMap<DedupKey, DateTime<Utc>>>,
}

impl Default for ActiveAlerts {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveAlerts {
    pub fn new() -> Self {
        Self {
            alerts: RwLock::new(Vec::new()),
            limit: DEFAULT_ALERT_LIMIT,
            dedup_window: Duration::minutes(DEFAULT_DEDUP_WINDOW_MINUTES),
            last_notified: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Append anomalies; returns the subset that should be notified
    pub async fn record(&self, anomalies: &[Anomaly]) -> Vec<Anomaly> {
        {
            let mut alerts = self.alerts.write().await;
            alerts.extend(anomalies.iter().filter(|a| !a.acknowledged).cloned());
            if alerts.len() > self.limit {
                let excess = alerts.len() - self.limit;
                alerts.drain(..excess);
            }
        }

        let mut last_notified = self.last_notified.write().await;
        if let Some(latest) = anomalies.iter().map(|a| a.detected_at).max() {
            last_notified.retain(|_, last| latest - *last < self.dedup_window);
        }
        let mut to_notify = Vec::new();
        for anomaly in anomalies {
            let key = DedupKey::of(anomaly);
            let suppressed = last_notified
                .get(&key)
                .map(|last| anomaly.detected_at - *last < self.dedup_window)
                .unwrap_or(false);
            if !suppressed {
                last_notified.insert(key, anomaly.detected_at);
                to_notify.push(anomaly.clone());
            }
        }
        to_notify
    }

    /// Unacknowledged alerts, high severity first, insertion order within a severity
    pub async fn active(&self) -> Vec<Anomaly> {
        let mut active: Vec<Anomaly> = self
            .alerts
            .read()
            .await
            .iter()
            .filter(|a| !a.acknowledged)
            .cloned()
            .collect();
        active.sort_by_key(|a| a.severity);
        active
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.alerts.read().await.iter().any(|a| a.id == id)
    }

    /// Drop an acknowledged alert; false if the id is unknown
    pub async fn acknowledge(&self, id: Uuid) -> bool {
        let mut alerts = self.alerts.write().await;
        let before = alerts.len();
        alerts.retain(|a| a.id != id);
        alerts.len() != before
    }

    pub async fn dedup_keys(&self) -> usize {
        self.last_notified.read().await.len()
    }

    pub async fn len(&self) -> usize {
        self.alerts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.alerts.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::types::{MetricType, Severity};

    fn alert(severity: Severity, service: &str, at: DateTime<Utc>) -> Anomaly {
        Anomaly {
            id: Uuid::new_v4(),
            provider: Provider::Aws,
            metric_type: MetricType::Cost,
            kind: AnomalyKind::ServiceCostIncrease,
            service: Some(service.to_string()),
            resource_id: None,
            baseline: 50.0,
            current: 80.0,
            percentage_increase: 60.0,
            severity,
            detected_at: at,
            acknowledged: false,
        }
    }

    #[tokio::test]
    async fn test_active_sorted_by_severity_then_insertion() {
        let now = Utc::now();
        let alerts = ActiveAlerts::new();
        let low = alert(Severity::Low, "a", now);
        let med1 = alert(Severity::Medium, "b", now);
        let high = alert(Severity::High, "c", now);
        let med2 = alert(Severity::Medium, "d", now);
        alerts
            .record(&[low.clone(), med1.clone(), high.clone(), med2.clone()])
            .await;

        let ids: Vec<Uuid> = alerts.active().await.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![high.id, med1.id, med2.id, low.id]);
    }

    #[tokio::test]
    async fn test_acknowledge_hides_alert() {
        let alerts = ActiveAlerts::new();
        let a = alert(Severity::High, "EC2", Utc::now());
        alerts.record(std::slice::from_ref(&a)).await;

        assert!(alerts.contains(a.id).await);
        assert!(alerts.acknowledge(a.id).await);
        assert!(alerts.active().await.is_empty());
        assert!(alerts.is_empty().await);
        assert!(!alerts.acknowledge(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_repeat_notifications_suppressed_within_window() {
        let now = Utc::now();
        let alerts = ActiveAlerts::new();

        let first = alerts.record(&[alert(Severity::High, "EC2", now)]).await;
        assert_eq!(first.len(), 1);

        let repeat = alerts
            .record(&[alert(Severity::High, "EC2", now + Duration::minutes(5))])
            .await;
        assert!(repeat.is_empty());

        let later = alerts
            .record(&[alert(Severity::High, "EC2", now + Duration::minutes(20))])
            .await;
        assert_eq!(later.len(), 1);

        // every occurrence is still tracked
        assert_eq!(alerts.active().await.len(), 3);
    }

    #[tokio::test]
    async fn test_state_stays_bounded_under_churn() {
        let start = Utc::now();
        let alerts = ActiveAlerts::new().with_limit(50);

        for i in 0..2_000 {
            let at = start + Duration::minutes(i);
            let a = alert(Severity::Medium, &format!("svc-{}", i), at);
            alerts.record(std::slice::from_ref(&a)).await;
            if i % 2 == 0 {
                assert!(alerts.acknowledge(a.id).await);
            }
        }

        assert_eq!(alerts.len().await, 50);
        // only keys notified within the last 15 minutes survive
        assert!(alerts.dedup_keys().await <= 15);
    }
}
