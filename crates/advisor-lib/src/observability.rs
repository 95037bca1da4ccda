//! Observability infrastructure for the optimization engine
//!
//! Provides:
//! - Prometheus metrics (recommendation latency, collection latency, anomalies, opportunities)
//! - Structured JSON logging with tracing

use crate::models::{Provider, Recommendation};
use crate::monitor::{Anomaly, OptimizationOpportunity, Severity};
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Latency buckets in seconds; collector calls can take a while
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

static GLOBAL_METRICS: OnceLock<AdvisorMetricsInner> = OnceLock::new();

struct AdvisorMetricsInner {
    recommendation_latency_seconds: Histogram,
    collection_latency_seconds: Histogram,
    resources_analyzed: IntGauge,
    recommended_moves: IntGauge,
    anomalies_detected: IntCounter,
    open_opportunities: IntGauge,
    plans_generated: IntCounter,
    job_failures: IntCounterVec,
}

impl AdvisorMetricsInner {
    fn new() -> Self {
        Self {
            recommendation_latency_seconds: register_histogram!(
                "cloud_advisor_recommendation_latency_seconds",
                "Time spent generating recommendations for a full inventory",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register recommendation_latency_seconds"),

            collection_latency_seconds: register_histogram!(
                "cloud_advisor_collection_latency_seconds",
                "Time spent in a single collector call",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register collection_latency_seconds"),

            resources_analyzed: register_int_gauge!(
                "cloud_advisor_resources_analyzed",
                "Resources covered by the latest recommendation run"
            )
            .expect("Failed to register resources_analyzed"),

            recommended_moves: register_int_gauge!(
                "cloud_advisor_recommended_moves",
                "Provider changes recommended by the latest run"
            )
            .expect("Failed to register recommended_moves"),

            anomalies_detected: register_int_counter!(
                "cloud_advisor_anomalies_detected_total",
                "Total number of cost and performance anomalies detected"
            )
            .expect("Failed to register anomalies_detected"),

            open_opportunities: register_int_gauge!(
                "cloud_advisor_open_opportunities",
                "Optimization opportunities in the current open set"
            )
            .expect("Failed to register open_opportunities"),

            plans_generated: register_int_counter!(
                "cloud_advisor_plans_generated_total",
                "Total number of migration plans generated"
            )
            .expect("Failed to register plans_generated"),

            job_failures: register_int_counter_vec!(
                "cloud_advisor_job_failures_total",
                "Scheduled monitor job failures",
                &["job"]
            )
            .expect("Failed to register job_failures"),
        }
    }
}

/// Handle to the process-wide Prometheus metrics
///
/// Clones share the same underlying series.
#[derive(Clone)]
pub struct AdvisorMetrics {
    _private: (),
}

impl Default for AdvisorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AdvisorMetricsInner {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new)
    }

    pub fn observe_recommendation_latency(&self, duration_secs: f64) {
        self.inner()
            .recommendation_latency_seconds
            .observe(duration_secs);
    }

    pub fn observe_collection_latency(&self, duration_secs: f64) {
        self.inner().collection_latency_seconds.observe(duration_secs);
    }

    /// Record the totals of a recommendation run
    pub fn set_run_totals(&self, resources: usize, moves: usize) {
        self.inner().resources_analyzed.set(resources as i64);
        self.inner().recommended_moves.set(moves as i64);
    }

    pub fn add_anomalies(&self, count: usize) {
        self.inner().anomalies_detected.inc_by(count as u64);
    }

    pub fn set_open_opportunities(&self, count: usize) {
        self.inner().open_opportunities.set(count as i64);
    }

    pub fn inc_plans_generated(&self) {
        self.inner().plans_generated.inc();
    }

    pub fn inc_job_failures(&self, job: &str) {
        self.inner().job_failures.with_label_values(&[job]).inc();
    }
}

/// Structured logger for engine events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, providers: &[Provider]) {
        let providers: Vec<&str> = providers.iter().map(|p| p.as_str()).collect();
        info!(
            event = "advisor_started",
            instance = %self.instance,
            advisor_version = %version,
            providers = ?providers,
            "Cloud advisor started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "advisor_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Cloud advisor shutting down"
        );
    }

    pub fn log_recommendation(&self, rec: &Recommendation) {
        info!(
            event = "recommendation_generated",
            instance = %self.instance,
            resource_id = %rec.resource_id,
            current_provider = %rec.current_provider,
            recommended_provider = %rec.recommended_provider,
            estimated_savings = rec.estimated_savings,
            confidence = %rec.confidence_score,
            complexity = %rec.migration_complexity.level,
            "Generated placement recommendation"
        );
    }

    /// Alert sink: one warning per anomaly
    pub fn log_anomaly(&self, anomaly: &Anomaly) {
        let target = anomaly
            .service
            .as_deref()
            .or(anomaly.resource_id.as_deref())
            .unwrap_or("total");

        match anomaly.severity {
            Severity::High => warn!(
                event = "anomaly_detected",
                instance = %self.instance,
                alert_id = %anomaly.id,
                provider = %anomaly.provider,
                metric_type = %anomaly.metric_type,
                anomaly_type = %anomaly.kind,
                target = %target,
                baseline = anomaly.baseline,
                current = anomaly.current,
                percentage_increase = anomaly.percentage_increase,
                severity = %anomaly.severity,
                "High severity anomaly detected"
            ),
            _ => warn!(
                event = "anomaly_detected",
                instance = %self.instance,
                alert_id = %anomaly.id,
                provider = %anomaly.provider,
                metric_type = %anomaly.metric_type,
                anomaly_type = %anomaly.kind,
                target = %target,
                baseline = anomaly.baseline,
                current = anomaly.current,
                percentage_increase = anomaly.percentage_increase,
                severity = %anomaly.severity,
                "Anomaly detected"
            ),
        }
    }

    pub fn log_opportunity(&self, opp: &OptimizationOpportunity) {
        info!(
            event = "opportunity_detected",
            instance = %self.instance,
            provider = %opp.provider,
            resource_id = %opp.resource_id,
            action = %opp.action,
            potential_savings = opp.potential_savings,
            priority = %opp.priority,
            "Optimization opportunity detected"
        );
    }

    pub fn log_job_completed(&self, job: &str, elapsed_ms: u128, detail: &str) {
        info!(
            event = "monitor_job_completed",
            instance = %self.instance,
            job = %job,
            elapsed_ms = elapsed_ms as u64,
            detail = %detail,
            "Monitor job completed"
        );
    }

    pub fn log_job_failed(&self, job: &str, error: &str) {
        warn!(
            event = "monitor_job_failed",
            instance = %self.instance,
            job = %job,
            error = %error,
            "Monitor job failed, will retry at next scheduled run"
        );
    }

    /// Provider treated as absent for this cycle
    pub fn log_provider_skipped(&self, provider: Provider, operation: &str, reason: &str) {
        warn!(
            event = "provider_skipped",
            instance = %self.instance,
            provider = %provider,
            operation = %operation,
            reason = %reason,
            "Provider skipped for this cycle"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisor_metrics_creation() {
        let metrics = AdvisorMetrics::new();
        metrics.observe_recommendation_latency(0.02);
        metrics.observe_collection_latency(0.4);
        metrics.set_run_totals(12, 3);
        metrics.add_anomalies(2);
        metrics.set_open_opportunities(5);
        metrics.inc_plans_generated();
        metrics.inc_job_failures("cost_collection");

        // Second handle shares the registered series
        let again = AdvisorMetrics::new();
        again.inc_plans_generated();
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("advisor-0");
        assert_eq!(logger.instance, "advisor-0");
    }
}
