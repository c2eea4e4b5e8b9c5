//! Validations shared by every action plan contract

use sd_core::error::ValidationErrors;
use sd_models::{ActionPlan, ActionPlanStatus, ActionTask};

use crate::base::{validate_not_blank, Contract, ValidationResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct ActionPlanBaseContract;

impl ActionPlanBaseContract {
    pub fn validate_task(&self, task: &ActionTask, errors: &mut ValidationErrors) {
        if task.description.trim().is_empty() {
            errors.add("tasks", "description can't be blank");
        }
    }

    pub fn validate_cancellation(&self, plan: &ActionPlan, errors: &mut ValidationErrors) {
        let justified = plan
            .cancellation_reason
            .as_deref()
            .is_some_and(|reason| !reason.trim().is_empty());
        if plan.status == ActionPlanStatus::Cancelled && !justified {
            errors.add("cancellationReason", "can't be blank when cancelling");
        }
    }
}

impl Contract<ActionPlan> for ActionPlanBaseContract {
    fn validate(&self, plan: &ActionPlan) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_not_blank("title", &plan.title, &mut errors);
        for task in &plan.tasks {
            self.validate_task(task, &mut errors);
        }
        self.validate_cancellation(plan, &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sd_models::EntityRef;

    fn deadline() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_valid_plan() {
        let plan = ActionPlan::new("Recover NPS", EntityRef::Kpi(2))
            .with_task(ActionTask::new("Call detractors", Some(3), deadline()));
        assert!(ActionPlanBaseContract.validate(&plan).is_ok());
    }

    #[test]
    fn test_blank_task_description() {
        let plan = ActionPlan::new("Recover NPS", EntityRef::Kpi(2))
            .with_task(ActionTask::new(" ", None, deadline()));
        let errors = ActionPlanBaseContract.validate(&plan).unwrap_err();
        assert!(errors.has_error("tasks"));
    }

    #[test]
    fn test_cancelled_without_reason() {
        let mut plan = ActionPlan::new("Recover NPS", EntityRef::Okr(1));
        plan.status = ActionPlanStatus::Cancelled;
        plan.cancellation_reason = Some("   ".into());
        let errors = ActionPlanBaseContract.validate(&plan).unwrap_err();
        assert!(errors.has_error("cancellationReason"));
    }
}
