//! Wall-clock scheduling of monitor jobs
//!
//! Each job runs in its own task on a cron-like schedule. Jobs are
//! independent: a slow cost collection never delays performance collection.
//! Failures are reported by the monitor and never stop the scheduler.

use super::ContinuousMonitor;
use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// When a job fires, in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Every day at hour:minute
    Daily { hour: u32, minute: u32 },
    /// Every hour at the given minute
    Hourly { minute: u32 },
    /// At hours divisible by `hours`, at the given minute
    EveryHours { hours: u32, minute: u32 },
    /// Once, as soon as the scheduler starts
    Once,
}

impl Schedule {
    /// First firing strictly after `now`; `None` for one-shot schedules
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let date = now.date_naive();
        match *self {
            Schedule::Daily { hour, minute } => {
                let today = date.and_hms_opt(hour, minute, 0)?.and_utc();
                Some(if today > now {
                    today
                } else {
                    today + ChronoDuration::days(1)
                })
            }
            Schedule::Hourly { minute } => {
                let this_hour = date.and_hms_opt(now.hour(), minute, 0)?.and_utc();
                Some(if this_hour > now {
                    this_hour
                } else {
                    this_hour + ChronoDuration::hours(1)
                })
            }
            Schedule::EveryHours { hours, minute } => (0..24)
                .step_by(hours.clamp(1, 24) as usize)
                .filter_map(|h| date.and_hms_opt(h, minute, 0))
                .map(|t| t.and_utc())
                .find(|t| *t > now)
                .or_else(|| {
                    (date + ChronoDuration::days(1))
                        .and_hms_opt(0, minute, 0)
                        .map(|t| t.and_utc())
                }),
            Schedule::Once => None,
        }
    }
}

/// The five scheduled monitor jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorJob {
    CostCollection,
    PerformanceCollection,
    UtilizationCollection,
    OptimizationAnalysis,
    AlertSubscription,
}

impl MonitorJob {
    pub const ALL: [MonitorJob; 5] = [
        MonitorJob::CostCollection,
        MonitorJob::PerformanceCollection,
        MonitorJob::UtilizationCollection,
        MonitorJob::OptimizationAnalysis,
        MonitorJob::AlertSubscription,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorJob::CostCollection => "cost_collection",
            MonitorJob::PerformanceCollection => "performance_collection",
            MonitorJob::UtilizationCollection => "utilization_collection",
            MonitorJob::OptimizationAnalysis => "optimization_analysis",
            MonitorJob::AlertSubscription => "alert_subscription",
        }
    }

    pub fn schedule(&self) -> Schedule {
        match self {
            MonitorJob::CostCollection => Schedule::Daily { hour: 1, minute: 0 },
            MonitorJob::PerformanceCollection => Schedule::Hourly { minute: 0 },
            MonitorJob::UtilizationCollection => Schedule::EveryHours { hours: 6, minute: 0 },
            MonitorJob::OptimizationAnalysis => Schedule::Daily { hour: 2, minute: 0 },
            MonitorJob::AlertSubscription => Schedule::Once,
        }
    }
}

impl fmt::Display for MonitorJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MonitorJob {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MonitorJob::ALL
            .into_iter()
            .find(|job| job.as_str() == s)
            .ok_or_else(|| format!("unknown monitor job '{}'", s))
    }
}

/// Runs monitor jobs on their schedules until shutdown
pub struct Scheduler {
    monitor: Arc<ContinuousMonitor>,
    jobs: Vec<MonitorJob>,
    run_on_start: bool,
}

impl Scheduler {
    /// Spawn one task per job and wait for all of them to stop
    pub async fn run(self, shutdown: broadcast::Receiver<()>) {
        info!(
            jobs = ?self.jobs.iter().map(|j| j.as_str()).collect::<Vec<_>>(),
            run_on_start = self.run_on_start,
            "Starting monitor scheduler"
        );

        let handles: Vec<JoinHandle<()>> = self
            .jobs
            .iter()
            .map(|job| {
                tokio::spawn(run_job(
                    self.monitor.clone(),
                    *job,
                    self.run_on_start,
                    shutdown.resubscribe(),
                ))
            })
            .collect();

        for handle in handles {
            let _ = handle.await;
        }
        info!("Monitor scheduler stopped");
    }
}

async fn run_job(
    monitor: Arc<ContinuousMonitor>,
    job: MonitorJob,
    run_on_start: bool,
    mut shutdown: broadcast::Receiver<()>,
) {
    let schedule = job.schedule();

    if schedule == Schedule::Once || run_on_start {
        // errors are logged and counted by the monitor
        let _ = monitor.run_scheduled_collection(job).await;
    }

    loop {
        let Some(next) = schedule.next_after(Utc::now()) else {
            debug!(job = %job, "One-shot job finished");
            return;
        };
        let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        debug!(job = %job, next_run = %next, "Job scheduled");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                let _ = monitor.run_scheduled_collection(job).await;
            }
            _ = shutdown.recv() => {
                debug!(job = %job, "Stopping scheduled job");
                return;
            }
        }
    }
}

/// Builder for the monitor scheduler
pub struct SchedulerBuilder {
    monitor: Option<Arc<ContinuousMonitor>>,
    jobs: Vec<MonitorJob>,
    run_on_start: bool,
}

impl SchedulerBuilder {
    /// All five jobs, first run at their next scheduled time
    pub fn new() -> Self {
        Self {
            monitor: None,
            jobs: MonitorJob::ALL.to_vec(),
            run_on_start: false,
        }
    }

    pub fn monitor(mut self, monitor: Arc<ContinuousMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Restrict the scheduler to a subset of jobs
    pub fn jobs(mut self, jobs: Vec<MonitorJob>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Also run every job once immediately at start-up
    pub fn run_on_start(mut self, enabled: bool) -> Self {
        self.run_on_start = enabled;
        self
    }

    pub fn build(self) -> Result<Scheduler> {
        let monitor = self
            .monitor
            .ok_or_else(|| anyhow::anyhow!("Monitor is required"))?;
        if self.jobs.is_empty() {
            anyhow::bail!("At least one job is required");
        }

        Ok(Scheduler {
            monitor,
            jobs: self.jobs,
            run_on_start: self.run_on_start,
        })
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_daily_schedule() {
        let s = Schedule::Daily { hour: 1, minute: 0 };
        assert_eq!(s.next_after(at(19, 0, 30)), Some(at(19, 1, 0)));
        // strictly after
        assert_eq!(s.next_after(at(19, 1, 0)), Some(at(20, 1, 0)));
        assert_eq!(s.next_after(at(19, 23, 59)), Some(at(20, 1, 0)));
    }

    #[test]
    fn test_hourly_schedule() {
        let s = Schedule::Hourly { minute: 0 };
        assert_eq!(s.next_after(at(19, 10, 15)), Some(at(19, 11, 0)));
        assert_eq!(s.next_after(at(19, 23, 15)), Some(at(20, 0, 0)));
    }

    #[test]
    fn test_every_six_hours() {
        let s = MonitorJob::UtilizationCollection.schedule();
        assert_eq!(s.next_after(at(19, 7, 0)), Some(at(19, 12, 0)));
        assert_eq!(s.next_after(at(19, 18, 0)), Some(at(20, 0, 0)));
        assert_eq!(s.next_after(at(19, 0, 0)), Some(at(19, 6, 0)));
    }

    #[test]
    fn test_once_has_no_next_run() {
        assert_eq!(MonitorJob::AlertSubscription.schedule().next_after(at(19, 0, 0)), None);
    }

    #[test]
    fn test_job_names_round_trip() {
        for job in MonitorJob::ALL {
            assert_eq!(job.as_str().parse::<MonitorJob>().unwrap(), job);
        }
        assert!("nightly".parse::<MonitorJob>().is_err());
    }

    #[test]
    fn test_builder_requires_monitor() {
        assert!(SchedulerBuilder::new().build().is_err());
    }
}
