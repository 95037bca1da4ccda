//! Cloud Advisor - multi-cloud optimization daemon
//!
//! Serves recommendations and migration plans over HTTP and runs the
//! continuous monitor's scheduled jobs in the background.

use advisor_lib::{
    collector::{
        FileMetricsCollector, FileResourceCollector, MetricsCollector, ResourceCollector,
    },
    health::{components, HealthRegistry},
    monitor::{ContinuousMonitor, MonitorStores, SchedulerBuilder},
    observability::{AdvisorMetrics, StructuredLogger},
    planner::MigrationPlanner,
    pricing::{PricingAnalyzer, StaticPricingSource},
    recommendation::RecommendationEngine,
    store::MemoryStore,
};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const ADVISOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-check price staleness every hour; the cache decides what to refetch
const PRICING_CHECK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting cloud-advisor");

    let config = config::AdvisorConfig::load()?;
    info!(
        api_port = config.api_port,
        inventory = %config.inventory_path.display(),
        metrics_dir = %config.metrics_dir.display(),
        "Advisor configured"
    );

    let health_registry = HealthRegistry::new();
    for component in [
        components::COLLECTOR,
        components::PRICING,
        components::MONITOR,
        components::STORE,
    ] {
        health_registry.register(component).await;
    }

    let metrics = AdvisorMetrics::new();
    let logger = StructuredLogger::new("cloud-advisor");

    let resource_collector = Arc::new(FileResourceCollector::new(&config.inventory_path));
    let metrics_collector = Arc::new(FileMetricsCollector::new(&config.metrics_dir));

    let providers = resource_collector.configured_providers().await;
    if providers.is_empty() {
        warn!(
            inventory = %resource_collector.path().display(),
            "No providers found in resource inventory"
        );
        health_registry
            .set_degraded(components::COLLECTOR, "no providers in resource inventory")
            .await;
    }
    logger.log_startup(ADVISOR_VERSION, &providers);

    let pricing = Arc::new(
        PricingAnalyzer::with_refresh_interval(
            Arc::new(StaticPricingSource::new()),
            config.pricing_refresh_interval(),
        )
        .with_health(health_registry.clone()),
    );
    pricing.refresh(Utc::now()).await;

    let store = Arc::new(MemoryStore::new());

    let engine = Arc::new(
        RecommendationEngine::new(resource_collector, pricing.clone())
            .with_collector_timeout(config.collector_timeout())
            .with_logger(logger.clone())
            .with_metrics(metrics.clone()),
    );

    let monitor = Arc::new(
        ContinuousMonitor::new(
            metrics_collector.clone() as Arc<dyn MetricsCollector>,
            MonitorStores::shared(store.clone()),
        )
        .with_collector_timeout(config.collector_timeout())
        .with_logger(logger.clone())
        .with_metrics(metrics.clone())
        .with_health(health_registry.clone()),
    );

    let planner = Arc::new(MigrationPlanner::new(store).with_metrics(metrics.clone()));

    let scheduler = SchedulerBuilder::new()
        .monitor(monitor.clone())
        .run_on_start(config.run_startup_collection)
        .build()?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let app_state = Arc::new(api::AppState {
        health_registry: health_registry.clone(),
        monitor,
        engine,
        planner,
    });

    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_tx.subscribe()));
    let pricing_handle = tokio::spawn(refresh_pricing(pricing, shutdown_tx.subscribe()));
    let api_handle = tokio::spawn(api::serve(
        config.api_port,
        app_state,
        shutdown_tx.subscribe(),
    ));

    health_registry.set_ready(true).await;

    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    let _ = shutdown_tx.send(());
    let _ = scheduler_handle.await;
    let _ = pricing_handle.await;
    match api_handle.await {
        Ok(Err(e)) => warn!(error = %e, "API server exited with error"),
        Err(e) => warn!(error = %e, "API server task panicked"),
        Ok(Ok(())) => {}
    }

    Ok(())
}

async fn refresh_pricing(pricing: Arc<PricingAnalyzer>, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval(PRICING_CHECK_INTERVAL);
    // first tick completes immediately; start-up already refreshed
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => pricing.refresh(Utc::now()).await,
            _ = shutdown.recv() => return,
        }
    }
}
