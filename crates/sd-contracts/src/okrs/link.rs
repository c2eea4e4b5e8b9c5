//! Contract for linking KPIs to an objective

use sd_core::error::ValidationErrors;
use sd_core::traits::SoftDeletable;
use sd_models::{Kpi, Okr, PermissionAction, PermissionModule};

use crate::base::{require_permission, Contract, UserContext, ValidationResult};

/// Validates the KPI about to be linked to, or unlinked from, `okr`
pub struct LinkKpiContract<'a, U: UserContext> {
    user: &'a U,
    okr: &'a Okr,
}

impl<'a, U: UserContext> LinkKpiContract<'a, U> {
    pub fn new(user: &'a U, okr: &'a Okr) -> Self {
        Self { user, okr }
    }
}

impl<'a, U: UserContext> Contract<Kpi> for LinkKpiContract<'a, U> {
    fn validate(&self, kpi: &Kpi) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        require_permission(self.user, PermissionModule::Okr, PermissionAction::Edit, &mut errors);

        if self.okr.is_deleted() {
            errors.add_base("Objective is deleted");
        }
        if kpi.id.is_none() {
            errors.add("kpiIds", "must reference a saved KPI");
        }
        if kpi.is_deleted() {
            errors.add("kpiIds", "can't reference a deleted KPI");
        }

        errors.into_result()
    }
}
