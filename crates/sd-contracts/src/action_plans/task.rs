//! Contract for adding tasks to an action plan

use sd_core::error::ValidationErrors;
use sd_models::{ActionPlan, ActionTask, PermissionAction};

use super::base::ActionPlanBaseContract;
use crate::base::{require_permission, Contract, UserContext, ValidationResult};

pub struct TaskContract<'a, U: UserContext> {
    user: &'a U,
    plan: &'a ActionPlan,
}

impl<'a, U: UserContext> TaskContract<'a, U> {
    pub fn new(user: &'a U, plan: &'a ActionPlan) -> Self {
        Self { user, plan }
    }
}

impl<'a, U: UserContext> Contract<ActionTask> for TaskContract<'a, U> {
    fn validate(&self, task: &ActionTask) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        require_permission(self.user, self.plan.entity.module(), PermissionAction::Edit, &mut errors);

        if self.plan.status.is_terminal() {
            errors.add_base(format!(
                "Tasks can't be changed on a {} plan",
                self.plan.status.as_str()
            ));
        }

        ActionPlanBaseContract.validate_task(task, &mut errors);
        errors.into_result()
    }
}
