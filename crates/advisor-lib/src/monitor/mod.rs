//! Continuous monitoring
//!
//! Periodically collects cost, performance and utilization telemetry,
//! compares it against stored baselines, raises alerts for deviations and
//! maintains the set of open optimization opportunities.
//!
//! Detection logic in [`anomaly`] and [`opportunities`] is pure; the
//! [`ContinuousMonitor`] owns the I/O around it and the [`schedule`] module
//! decides when each job runs.

pub mod alerts;
pub mod anomaly;
pub mod opportunities;
pub mod schedule;
mod types;

pub use alerts::ActiveAlerts;
pub use opportunities::{find_optimization_opportunities, potential_savings, summarize};
pub use schedule::{MonitorJob, Schedule, Scheduler, SchedulerBuilder};
pub use types::*;

use crate::collector::{
    collect_per_provider, DateRange, MetricsCollector, DEFAULT_COLLECTOR_TIMEOUT,
};
use crate::error::{AdvisorError, Result};
use crate::health::{components, HealthRegistry};
use crate::observability::{AdvisorMetrics, StructuredLogger};
use crate::store::{AnomalyStore, BaselineStore, MetricStore, OpportunityStore};
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Days of billing data requested by the cost job
pub const COST_WINDOW_DAYS: i64 = 30;

/// Persistence collaborators used by the monitor
#[derive(Clone)]
pub struct MonitorStores {
    pub baselines: Arc<dyn BaselineStore>,
    pub history: Arc<dyn MetricStore>,
    pub anomalies: Arc<dyn AnomalyStore>,
    pub opportunities: Arc<dyn OpportunityStore>,
}

impl MonitorStores {
    /// Use one store for every concern
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: BaselineStore + MetricStore + AnomalyStore + OpportunityStore + 'static,
    {
        Self {
            baselines: store.clone(),
            history: store.clone(),
            anomalies: store.clone(),
            opportunities: store,
        }
    }
}

/// Outcome of one job run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub job: MonitorJob,
    /// Providers that returned data
    pub providers: usize,
    pub anomalies: usize,
    pub opportunities: usize,
}

impl JobReport {
    fn new(job: MonitorJob) -> Self {
        Self {
            job,
            providers: 0,
            anomalies: 0,
            opportunities: 0,
        }
    }

    pub fn detail(&self) -> String {
        format!(
            "providers={} anomalies={} opportunities={}",
            self.providers, self.anomalies, self.opportunities
        )
    }
}

pub struct ContinuousMonitor {
    collector: Arc<dyn MetricsCollector>,
    stores: MonitorStores,
    alerts: ActiveAlerts,
    logger: StructuredLogger,
    metrics: Option<AdvisorMetrics>,
    health: Option<HealthRegistry>,
    collector_timeout: Duration,
    subscribed: AtomicBool,
}

impl ContinuousMonitor {
    pub fn new(collector: Arc<dyn MetricsCollector>, stores: MonitorStores) -> Self {
        Self {
            collector,
            stores,
            alerts: ActiveAlerts::new(),
            logger: StructuredLogger::new("monitor"),
            metrics: None,
            health: None,
            collector_timeout: DEFAULT_COLLECTOR_TIMEOUT,
            subscribed: AtomicBool::new(false),
        }
    }

    pub fn with_alerts(mut self, alerts: ActiveAlerts) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_metrics(mut self, metrics: AdvisorMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_collector_timeout(mut self, timeout: Duration) -> Self {
        self.collector_timeout = timeout;
        self
    }

    /// Report job outcomes on the monitor and store health components
    pub fn with_health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    /// Run one job, logging and counting its failure instead of propagating a panic
    pub async fn run_scheduled_collection(&self, job: MonitorJob) -> Result<JobReport> {
        let start = Instant::now();
        let result = match job {
            MonitorJob::CostCollection => self.collect_cost_metrics().await,
            MonitorJob::PerformanceCollection => self.collect_performance_metrics().await,
            MonitorJob::UtilizationCollection => self.collect_utilization_metrics().await,
            MonitorJob::OptimizationAnalysis => self
                .analyze_optimization_opportunities()
                .await
                .map(|opps| JobReport {
                    opportunities: opps.len(),
                    ..JobReport::new(job)
                }),
            MonitorJob::AlertSubscription => self.setup_alert_subscription().await,
        };

        match &result {
            Ok(report) => {
                self.logger
                    .log_job_completed(job.as_str(), start.elapsed().as_millis(), &report.detail())
            }
            Err(e) => {
                self.logger.log_job_failed(job.as_str(), &e.to_string());
                if let Some(m) = &self.metrics {
                    m.inc_job_failures(job.as_str());
                }
            }
        }
        self.report_health(job, &result).await;
        result
    }

    async fn report_health(&self, job: MonitorJob, result: &Result<JobReport>) {
        let Some(health) = &self.health else {
            return;
        };

        match result {
            Ok(_) => {
                health.set_healthy(components::MONITOR).await;
                if job != MonitorJob::AlertSubscription {
                    health.set_healthy(components::STORE).await;
                }
            }
            Err(AdvisorError::Store(message)) => {
                health.set_unhealthy(components::STORE, message.clone()).await;
                health
                    .set_degraded(components::MONITOR, format!("{} failed on store", job))
                    .await;
            }
            Err(e) => {
                health
                    .set_degraded(components::MONITOR, format!("{} failed: {}", job, e))
                    .await;
            }
        }
    }

    /// Collect the last 30 days of billing data and check it for anomalies
    pub async fn collect_cost_metrics(&self) -> Result<JobReport> {
        let now = Utc::now();
        let range = DateRange::last_days(now, COST_WINDOW_DAYS);
        let results = collect_per_provider(
            "collect_costs",
            self.collector_timeout,
            &self.logger,
            self.metrics.as_ref(),
            |provider| self.collector.collect_costs(provider, range),
        )
        .await;

        let mut report = JobReport::new(MonitorJob::CostCollection);
        if results.is_empty() {
            debug!("No cost data collected this cycle");
            return Ok(report);
        }

        let snapshot = CostSnapshot {
            collected_at: now,
            providers: results.data,
        };
        report.providers = snapshot.providers.len();
        self.stores
            .history
            .append_snapshot(MetricSnapshot::Cost(snapshot.clone()))
            .await?;
        report.anomalies = self.check_cost_anomalies(&snapshot).await?.len();
        Ok(report)
    }

    pub async fn collect_performance_metrics(&self) -> Result<JobReport> {
        let now = Utc::now();
        let results = collect_per_provider(
            "collect_performance",
            self.collector_timeout,
            &self.logger,
            self.metrics.as_ref(),
            |provider| self.collector.collect_performance(provider),
        )
        .await;

        let mut report = JobReport::new(MonitorJob::PerformanceCollection);
        if results.is_empty() {
            debug!("No performance data collected this cycle");
            return Ok(report);
        }

        let snapshot = PerformanceSnapshot {
            collected_at: now,
            providers: results.data,
        };
        report.providers = snapshot.providers.len();
        self.stores
            .history
            .append_snapshot(MetricSnapshot::Performance(snapshot.clone()))
            .await?;
        report.anomalies = self.check_performance_anomalies(&snapshot).await?.len();
        Ok(report)
    }

    pub async fn collect_utilization_metrics(&self) -> Result<JobReport> {
        let now = Utc::now();
        let results = collect_per_provider(
            "collect_utilization",
            self.collector_timeout,
            &self.logger,
            self.metrics.as_ref(),
            |provider| self.collector.collect_utilization(provider),
        )
        .await;

        let mut report = JobReport::new(MonitorJob::UtilizationCollection);
        if results.is_empty() {
            debug!("No utilization data collected this cycle");
            return Ok(report);
        }

        report.providers = results.data.len();
        self.stores
            .history
            .append_snapshot(MetricSnapshot::Utilization(UtilizationSnapshot {
                collected_at: now,
                providers: results.data,
            }))
            .await?;
        Ok(report)
    }

    /// Derive opportunities from the latest utilization snapshot and replace the open set
    pub async fn analyze_optimization_opportunities(
        &self,
    ) -> Result<Vec<OptimizationOpportunity>> {
        let snapshot = match self
            .stores
            .history
            .latest_snapshot(MetricType::Utilization)
            .await?
        {
            Some(MetricSnapshot::Utilization(s)) => s,
            Some(other) => {
                return Err(AdvisorError::Store(format!(
                    "latest utilization snapshot has metric type {}",
                    other.metric_type()
                )))
            }
            None => {
                info!("No utilization metrics available for optimization analysis");
                return Ok(Vec::new());
            }
        };

        let opportunities = find_optimization_opportunities(&snapshot);
        self.stores
            .opportunities
            .replace_open_opportunities(opportunities.clone())
            .await?;

        for opp in &opportunities {
            self.logger.log_opportunity(opp);
        }
        if let Some(m) = &self.metrics {
            m.set_open_opportunities(opportunities.len());
        }
        info!(
            event = "optimization_analysis_complete",
            opportunities = opportunities.len(),
            potential_savings = opportunities.iter().map(|o| o.potential_savings).sum::<f64>(),
            "Optimization analysis complete"
        );

        Ok(opportunities)
    }

    /// Register for provider-pushed alerts; later calls are no-ops
    ///
    /// Native notification channels are outside the engine, so this only
    /// records which providers the alert sink covers.
    pub async fn setup_alert_subscription(&self) -> Result<JobReport> {
        let mut report = JobReport::new(MonitorJob::AlertSubscription);
        if self.subscribed.swap(true, Ordering::SeqCst) {
            debug!("Alert subscription already set up");
            return Ok(report);
        }

        let providers = self.collector.configured_providers().await;
        for provider in &providers {
            info!(
                event = "alert_subscription_ready",
                provider = %provider,
                "Alert subscription ready"
            );
        }
        report.providers = providers.len();
        Ok(report)
    }

    /// Check a snapshot of the given metric type against its baseline
    pub async fn check_anomalies(
        &self,
        metric_type: MetricType,
        snapshot: &MetricSnapshot,
    ) -> Result<Vec<Anomaly>> {
        if snapshot.metric_type() != metric_type {
            return Err(AdvisorError::Store(format!(
                "snapshot has metric type {}, expected {}",
                snapshot.metric_type(),
                metric_type
            )));
        }

        match snapshot {
            MetricSnapshot::Cost(s) => self.check_cost_anomalies(s).await,
            MetricSnapshot::Performance(s) => self.check_performance_anomalies(s).await,
            MetricSnapshot::Utilization(_) => Ok(Vec::new()),
        }
    }

    /// Compare against the cost baseline; the first snapshot becomes the baseline
    pub async fn check_cost_anomalies(&self, current: &CostSnapshot) -> Result<Vec<Anomaly>> {
        let anomalies = match self.stores.baselines.get_baseline(MetricType::Cost).await? {
            None => {
                self.capture_baseline(MetricSnapshot::Cost(current.clone()))
                    .await?;
                return Ok(Vec::new());
            }
            Some(MetricSnapshot::Cost(baseline)) => {
                anomaly::compare_cost_snapshots(current, &baseline)
            }
            Some(other) => return Err(baseline_mismatch(MetricType::Cost, &other)),
        };

        self.handle_anomalies(&anomalies, MetricType::Cost).await?;
        Ok(anomalies)
    }

    pub async fn check_performance_anomalies(
        &self,
        current: &PerformanceSnapshot,
    ) -> Result<Vec<Anomaly>> {
        let anomalies = match self
            .stores
            .baselines
            .get_baseline(MetricType::Performance)
            .await?
        {
            None => {
                self.capture_baseline(MetricSnapshot::Performance(current.clone()))
                    .await?;
                return Ok(Vec::new());
            }
            Some(MetricSnapshot::Performance(baseline)) => {
                anomaly::compare_performance_snapshots(current, &baseline)
            }
            Some(other) => return Err(baseline_mismatch(MetricType::Performance, &other)),
        };

        self.handle_anomalies(&anomalies, MetricType::Performance)
            .await?;
        Ok(anomalies)
    }

    async fn capture_baseline(&self, snapshot: MetricSnapshot) -> Result<()> {
        info!(
            event = "baseline_captured",
            metric_type = %snapshot.metric_type(),
            providers = snapshot.provider_count(),
            "No baseline yet, storing current metrics as baseline"
        );
        self.stores.baselines.set_baseline(snapshot).await
    }

    async fn handle_anomalies(
        &self,
        anomalies: &[Anomaly],
        metric_type: MetricType,
    ) -> Result<()> {
        if anomalies.is_empty() {
            return Ok(());
        }

        self.stores
            .anomalies
            .store_anomalies(anomalies, metric_type)
            .await?;

        for anomaly in self.alerts.record(anomalies).await {
            self.logger.log_anomaly(&anomaly);
        }
        if let Some(m) = &self.metrics {
            m.add_anomalies(anomalies.len());
        }
        Ok(())
    }

    /// Unacknowledged alerts, high severity first
    pub async fn active_alerts(&self) -> Vec<Anomaly> {
        self.alerts.active().await
    }

    /// Acknowledge in memory and in the store; `false` if the alert is unknown
    pub async fn acknowledge_alert(&self, id: Uuid) -> Result<bool> {
        if !self.alerts.contains(id).await {
            return Ok(false);
        }
        self.stores.anomalies.acknowledge(id).await?;
        self.alerts.acknowledge(id).await;
        info!(event = "alert_acknowledged", alert_id = %id, "Alert acknowledged");
        Ok(true)
    }

    pub async fn open_opportunities(&self) -> Result<Vec<OptimizationOpportunity>> {
        self.stores.opportunities.list_open_opportunities().await
    }

    pub async fn optimization_summary(&self) -> Result<OptimizationSummary> {
        Ok(summarize(&self.open_opportunities().await?))
    }
}

fn baseline_mismatch(expected: MetricType, found: &MetricSnapshot) -> AdvisorError {
    AdvisorError::Store(format!(
        "baseline for {} has metric type {}",
        expected,
        found.metric_type()
    ))
}
