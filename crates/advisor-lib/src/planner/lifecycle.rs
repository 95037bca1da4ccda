//! Stored migration plans and their status transitions

use super::MigrationPlan;
use crate::error::{AdvisorError, Result};
use crate::models::PlanStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A migration plan as persisted by a [`crate::store::PlanStore`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: Uuid,
    pub plan: MigrationPlan,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PlanRecord {
    /// Wrap a plan for storage, rejecting plans with empty required fields
    pub fn new(plan: MigrationPlan, now: DateTime<Utc>) -> Result<Self> {
        validate_plan(&plan)?;
        Ok(Self {
            id: Uuid::new_v4(),
            plan,
            status: PlanStatus::Created,
            created_at: now,
            updated_at: now,
            completed_at: None,
        })
    }

    pub fn transition(&mut self, next: PlanStatus, now: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(AdvisorError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.updated_at = now;
        if matches!(next, PlanStatus::Completed | PlanStatus::Failed) {
            self.completed_at = Some(now);
        }
        Ok(())
    }
}

pub fn validate_plan(plan: &MigrationPlan) -> Result<()> {
    if plan.resource_id.trim().is_empty() {
        return Err(AdvisorError::MissingField("resource_id"));
    }
    if plan.resource_type.trim().is_empty() {
        return Err(AdvisorError::MissingField("resource_type"));
    }
    if plan.estimated_timeframe.is_empty() {
        return Err(AdvisorError::MissingField("estimated_timeframe"));
    }
    if plan.downtime.estimated.is_empty() {
        return Err(AdvisorError::MissingField("downtime.estimated"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::generate_migration_plan;
    use crate::planner::tests::sample_recommendation;

    fn record() -> PlanRecord {
        let plan = generate_migration_plan(&sample_recommendation());
        PlanRecord::new(plan, Utc::now()).unwrap()
    }

    #[test]
    fn test_new_record_is_created() {
        let rec = record();
        assert_eq!(rec.status, PlanStatus::Created);
        assert!(rec.completed_at.is_none());
        assert_eq!(rec.created_at, rec.updated_at);
    }

    #[test]
    fn test_completion_sets_timestamp() {
        let mut rec = record();
        let later = rec.created_at + chrono::Duration::hours(2);
        rec.transition(PlanStatus::InProgress, later).unwrap();
        assert!(rec.completed_at.is_none());

        rec.transition(PlanStatus::Completed, later).unwrap();
        assert_eq!(rec.completed_at, Some(later));
        assert_eq!(rec.updated_at, later);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut rec = record();
        let err = rec.transition(PlanStatus::Completed, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            AdvisorError::InvalidTransition {
                from: PlanStatus::Created,
                to: PlanStatus::Completed
            }
        ));
        assert_eq!(rec.status, PlanStatus::Created);
    }

    #[test]
    fn test_missing_resource_id_rejected() {
        let mut plan = generate_migration_plan(&sample_recommendation());
        plan.resource_id = String::new();
        let err = PlanRecord::new(plan, Utc::now()).unwrap_err();
        assert!(matches!(err, AdvisorError::MissingField("resource_id")));
    }
}
