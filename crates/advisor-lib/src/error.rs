//! Error taxonomy for the optimization engine
//!
//! Scoring, classification and planning are pure and never fail; errors
//! originate at the collaborator boundary (collectors, pricing sources,
//! stores) or at validation points such as plan status transitions.

use crate::models::{PlanStatus, Provider};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Provider has no credentials or data source configured
    #[error("provider {0} is not configured")]
    ProviderNotConfigured(Provider),

    /// A provider's API failed mid-collection
    #[error("collection from {provider} failed: {message}")]
    Collection { provider: Provider, message: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("pricing source error: {0}")]
    Pricing(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid migration plan status transition from {from} to {to}")]
    InvalidTransition { from: PlanStatus, to: PlanStatus },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid cost period: {0}")]
    InvalidPeriod(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Configuration errors mean "treat the provider as absent", not "abort the run"
    pub fn is_not_configured(&self) -> bool {
        matches!(self, AdvisorError::ProviderNotConfigured(_))
    }
}
