//! Create contract for KPIs

use sd_core::error::ValidationErrors;
use sd_models::{Kpi, PermissionAction, PermissionModule};

use super::base::KpiBaseContract;
use crate::base::{require_permission, Contract, UserContext, ValidationResult};

/// Contract for creating a new KPI
pub struct CreateKpiContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> CreateKpiContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<Kpi> for CreateKpiContract<'a, U> {
    fn validate(&self, kpi: &Kpi) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        require_permission(self.user, PermissionModule::Kpi, PermissionAction::Create, &mut errors);

        if let Err(base_errors) = KpiBaseContract.validate(kpi) {
            errors.merge(base_errors);
        }

        // measurements go through their own command
        if !kpi.history.is_empty() {
            errors.add("history", "must be empty on creation");
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::test_support::MockUser;
    use chrono::NaiveDate;
    use sd_models::MeasurementEntry;

    #[test]
    fn test_creator_can_create() {
        let user = MockUser::with(PermissionModule::Kpi, &[PermissionAction::Create]);
        let kpi = Kpi::new("Revenue", 100.0, 40.0);
        assert!(CreateKpiContract::new(&user).validate(&kpi).is_ok());
    }

    #[test]
    fn test_editor_cannot_create() {
        let user = MockUser::with(PermissionModule::Kpi, &[PermissionAction::Edit]);
        let kpi = Kpi::new("Revenue", 100.0, 40.0);
        let errors = CreateKpiContract::new(&user).validate(&kpi).unwrap_err();
        assert!(errors.has_base_errors());
    }

    #[test]
    fn test_history_rejected() {
        let user = MockUser::admin();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let kpi = Kpi::new("Revenue", 100.0, 40.0)
            .with_history(vec![MeasurementEntry::new(date, 1.0, 1)]);
        let errors = CreateKpiContract::new(&user).validate(&kpi).unwrap_err();
        assert!(errors.has_error("history"));
    }
}
