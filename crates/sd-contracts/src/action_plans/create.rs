//! Create contract for action plans

use sd_core::error::ValidationErrors;
use sd_models::{ActionPlan, PermissionAction};

use super::base::ActionPlanBaseContract;
use crate::base::{require_permission, Contract, UserContext, ValidationResult};

/// Contract for opening an action plan against a KPI or OKR
///
/// Requires EDIT on the module of the referenced entity.
pub struct CreateActionPlanContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> CreateActionPlanContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<ActionPlan> for CreateActionPlanContract<'a, U> {
    fn validate(&self, plan: &ActionPlan) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        require_permission(self.user, plan.entity.module(), PermissionAction::Edit, &mut errors);

        if let Err(base_errors) = ActionPlanBaseContract.validate(plan) {
            errors.merge(base_errors);
        }

        if plan.status.is_terminal() {
            errors.add("status", "can't start as completed or cancelled");
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_support::MockUser;
    use sd_models::{ActionPlanStatus, EntityRef, PermissionModule};

    #[test]
    fn test_permission_follows_linked_module() {
        let okr_editor = MockUser::with(PermissionModule::Okr, &[PermissionAction::Edit]);
        let on_okr = ActionPlan::new("Refocus", EntityRef::Okr(1));
        let on_kpi = ActionPlan::new("Refocus", EntityRef::Kpi(1));

        assert!(CreateActionPlanContract::new(&okr_editor).validate(&on_okr).is_ok());
        assert!(CreateActionPlanContract::new(&okr_editor).validate(&on_kpi).is_err());
    }

    #[test]
    fn test_cannot_start_completed() {
        let user = MockUser::admin();
        let mut plan = ActionPlan::new("Done already", EntityRef::Kpi(1));
        plan.status = ActionPlanStatus::Completed;
        let errors = CreateActionPlanContract::new(&user).validate(&plan).unwrap_err();
        assert!(errors.has_error("status"));
    }
}
