//! Multi-cloud optimization engine
//!
//! This crate provides the core functionality for:
//! - Workload classification from resource metadata
//! - Cross-provider cost estimation
//! - Placement recommendations and an aggregate migration strategy
//! - Per-resource migration plans
//! - Continuous cost and performance monitoring
//! - Health checks and observability

pub mod classifier;
pub mod collector;
pub mod error;
pub mod health;
pub mod models;
pub mod monitor;
pub mod observability;
pub mod planner;
pub mod pricing;
pub mod recommendation;
pub mod store;

pub use error::{AdvisorError, Result};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{AdvisorMetrics, StructuredLogger};
