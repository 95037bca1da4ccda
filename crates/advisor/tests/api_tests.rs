//! Integration tests for the advisor API endpoints

#[allow(dead_code)]
#[path = "../src/api.rs"]
mod api;

use advisor_lib::{
    collector::{FileMetricsCollector, FileResourceCollector},
    health::{components, HealthRegistry},
    monitor::{ContinuousMonitor, CostMetrics, CostSnapshot, MonitorStores},
    observability::AdvisorMetrics,
    planner::MigrationPlanner,
    pricing::{PricingAnalyzer, StaticPricingSource},
    recommendation::RecommendationEngine,
    store::MemoryStore,
    Provider,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

const INVENTORY: &str = r#"{
  "aws": {
    "ec2": [
      {"id": "i-web", "resource_type": "m5.large", "kind": "instance", "provider": "aws", "region": "us-east-1"}
    ]
  }
}"#;

async fn setup_test_app(dir: &Path) -> (Router, Arc<api::AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::COLLECTOR).await;
    health_registry.register(components::MONITOR).await;

    let inventory = dir.join("inventory.json");
    std::fs::write(&inventory, INVENTORY).unwrap();

    let pricing = Arc::new(PricingAnalyzer::new(Arc::new(StaticPricingSource::new())));
    pricing.refresh(Utc::now()).await;

    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(api::AppState {
        health_registry,
        monitor: Arc::new(
            ContinuousMonitor::new(
                Arc::new(FileMetricsCollector::new(dir.join("metrics"))),
                MonitorStores::shared(store.clone()),
            )
            .with_metrics(AdvisorMetrics::new()),
        ),
        engine: Arc::new(RecommendationEngine::new(
            Arc::new(FileResourceCollector::new(inventory)),
            pricing,
        )),
        planner: Arc::new(MigrationPlanner::new(store)),
    });

    (api::create_router(state.clone()), state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn recommendation_body(resource_id: &str) -> Value {
    json!({
        "resource_id": resource_id,
        "resource_type": "m5.large",
        "resource_kind": "instance",
        "current_provider": "aws",
        "recommended_provider": "gcp",
        "current_cost": 70.08,
        "estimated_savings": 150.0,
        "confidence_score": "72.5%",
        "reasoning": ["GCP offers 20.0% cost savings."],
        "migration_complexity": {"level": "Medium", "score": 0.5, "factors": []},
        "classifications": ["general"]
    })
}

fn costs(total: f64) -> CostSnapshot {
    CostSnapshot::new(Utc::now()).with_provider(
        Provider::Aws,
        CostMetrics {
            total_cost: total,
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_healthz_returns_ok_when_degraded() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = setup_test_app(dir.path()).await;

    state
        .health_registry
        .set_degraded(components::COLLECTOR, "gcp skipped")
        .await;

    let (status, body) = send(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = setup_test_app(dir.path()).await;

    state
        .health_registry
        .set_unhealthy(components::MONITOR, "store unreachable")
        .await;

    let (status, body) = send(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_follows_registry() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = setup_test_app(dir.path()).await;

    let (status, _) = send(&app, "GET", "/readyz", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    state.health_registry.set_ready(true).await;
    let (status, body) = send(&app, "GET", "/readyz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_advisor_series() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = setup_test_app(dir.path()).await;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("cloud_advisor_open_opportunities"));
}

#[tokio::test]
async fn test_alert_acknowledgement() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = setup_test_app(dir.path()).await;

    // first snapshot becomes the baseline
    state.monitor.check_cost_anomalies(&costs(100.0)).await.unwrap();
    state.monitor.check_cost_anomalies(&costs(150.0)).await.unwrap();

    let (status, alerts) = send(&app, "GET", "/api/v1/alerts", None).await;
    assert_eq!(status, StatusCode::OK);
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["severity"], "high");

    let id = alerts[0]["id"].as_str().unwrap().to_string();
    let (status, _) = send(&app, "POST", &format!("/api/v1/alerts/{}/acknowledge", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, alerts) = send(&app, "GET", "/api/v1/alerts", None).await;
    assert!(alerts.as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/alerts/00000000-0000-0000-0000-000000000000/acknowledge",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_opportunity_summary_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = setup_test_app(dir.path()).await;

    let (status, body) = send(&app, "GET", "/api/v1/opportunities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = send(&app, "GET", "/api/v1/opportunities/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_opportunities"], 0);
}

#[tokio::test]
async fn test_recommendations_cover_inventory() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = setup_test_app(dir.path()).await;

    let (status, body) = send(&app, "GET", "/api/v1/recommendations", None).await;
    assert_eq!(status, StatusCode::OK);

    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["resource_id"], "i-web");
    assert_eq!(recs[0]["current_provider"], "aws");
    assert!(body["strategy"].is_object());
}

#[tokio::test]
async fn test_plan_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = setup_test_app(dir.path()).await;

    let body = recommendation_body("i-0abc");
    let (status, plan) = send(&app, "POST", "/api/v1/plans", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plan["status"], "created");
    assert_eq!(plan["plan"]["estimated_timeframe"], "2-4 weeks");

    let id = plan["id"].as_str().unwrap().to_string();
    let status_uri = format!("/api/v1/plans/{}/status", id);

    let body = json!({"status": "in_progress"});
    let (status, updated) = send(&app, "POST", &status_uri, Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "in_progress");

    let (status, _) = send(&app, "POST", &status_uri, Some(json!({"status": "created"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, fetched) = send(&app, "GET", &format!("/api/v1/plans/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "in_progress");

    let (_, plans) = send(&app, "GET", "/api/v1/plans", None).await;
    assert_eq!(plans.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_plan_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = setup_test_app(dir.path()).await;

    let (status, body) = send(&app, "POST", "/api/v1/plans", Some(recommendation_body(""))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("resource_id"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/plans/00000000-0000-0000-0000-000000000000/status",
        Some(json!({"status": "in_progress"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
