//! HTTP API: health probes, Prometheus metrics and the advisor REST surface

use advisor_lib::{
    health::{ComponentStatus, HealthRegistry},
    monitor::ContinuousMonitor,
    planner::MigrationPlanner,
    recommendation::RecommendationEngine,
    AdvisorError, PlanStatus, Recommendation,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub monitor: Arc<ContinuousMonitor>,
    pub engine: Arc<RecommendationEngine>,
    pub planner: Arc<MigrationPlanner>,
}

/// Maps library errors onto HTTP status codes
pub struct ApiError(AdvisorError);

impl From<AdvisorError> for ApiError {
    fn from(e: AdvisorError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AdvisorError::NotFound(_) => StatusCode::NOT_FOUND,
            AdvisorError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AdvisorError::MissingField(_) | AdvisorError::InvalidPeriod(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => {
                error!(error = %self.0, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// 200 while operational (degraded included), 503 when unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;
    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;
    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(readiness))
}

async fn metrics() -> Response {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&prometheus::gather(), &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn list_alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.monitor.active_alerts().await)
}

async fn acknowledge_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    if state.monitor.acknowledge_alert(id).await? {
        Ok(Json(json!({ "id": id, "acknowledged": true })))
    } else {
        Err(AdvisorError::NotFound(format!("alert {}", id)).into())
    }
}

async fn list_opportunities(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.monitor.open_opportunities().await?))
}

async fn opportunity_summary(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.monitor.optimization_summary().await?))
}

async fn recommendations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let run = state.engine.generate_recommendations().await;
    Json(json!({
        "generated_at": run.generated_at,
        "recommendations": run.recommendations,
        "strategy": run.strategy,
    }))
}

async fn create_plan(
    State(state): State<Arc<AppState>>,
    Json(rec): Json<Recommendation>,
) -> ApiResult<impl IntoResponse> {
    let record = state.planner.create_plan(&rec, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_plans(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.planner.list_plans().await?))
}

async fn get_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.planner.get_plan(id).await?))
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: PlanStatus,
}

async fn update_plan_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state
            .planner
            .update_status(id, update.status, Utc::now())
            .await?,
    ))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/alerts", get(list_alerts))
        .route("/api/v1/alerts/:id/acknowledge", post(acknowledge_alert))
        .route("/api/v1/opportunities", get(list_opportunities))
        .route("/api/v1/opportunities/summary", get(opportunity_summary))
        .route("/api/v1/recommendations", get(recommendations))
        .route("/api/v1/plans", get(list_plans).post(create_plan))
        .route("/api/v1/plans/:id", get(get_plan))
        .route("/api/v1/plans/:id/status", post(update_plan_status))
        .with_state(state)
}

pub async fn serve(
    port: u16,
    state: Arc<AppState>,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    Ok(())
}
