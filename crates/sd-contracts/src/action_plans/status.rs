//! Contract for action plan lifecycle changes

use sd_core::error::ValidationErrors;
use sd_models::{ActionPlan, ActionPlanStatus, PermissionAction};

use crate::base::{require_permission, Contract, UserContext, ValidationResult};

/// Requested move of an action plan to a new status
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStatusChange {
    pub to: ActionPlanStatus,
    pub justification: Option<String>,
}

impl PlanStatusChange {
    pub fn to(status: ActionPlanStatus) -> Self {
        Self {
            to: status,
            justification: None,
        }
    }

    pub fn cancel(justification: impl Into<String>) -> Self {
        Self {
            to: ActionPlanStatus::Cancelled,
            justification: Some(justification.into()),
        }
    }
}

pub struct PlanStatusContract<'a, U: UserContext> {
    user: &'a U,
    plan: &'a ActionPlan,
}

impl<'a, U: UserContext> PlanStatusContract<'a, U> {
    pub fn new(user: &'a U, plan: &'a ActionPlan) -> Self {
        Self { user, plan }
    }
}

impl<'a, U: UserContext> Contract<PlanStatusChange> for PlanStatusContract<'a, U> {
    fn validate(&self, change: &PlanStatusChange) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        require_permission(self.user, self.plan.entity.module(), PermissionAction::Edit, &mut errors);

        if !self.plan.status.can_transition_to(change.to) {
            errors.add(
                "status",
                format!(
                    "can't change from {} to {}",
                    self.plan.status.as_str(),
                    change.to.as_str()
                ),
            );
        }

        let justified = change
            .justification
            .as_deref()
            .is_some_and(|j| !j.trim().is_empty());
        if change.to == ActionPlanStatus::Cancelled && !justified {
            errors.add("cancellationReason", "can't be blank when cancelling");
        }

        errors.into_result()
    }
}
