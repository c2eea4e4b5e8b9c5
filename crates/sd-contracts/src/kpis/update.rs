//! Update contract for KPIs

use sd_core::error::ValidationErrors;
use sd_models::{Kpi, PermissionAction, PermissionModule};

use super::base::KpiBaseContract;
use crate::base::{require_permission, ChangeTracker, Contract, UserContext, ValidationResult};

/// Contract for editing an existing KPI's definition
///
/// Values, history and status only change through measurements.
pub struct UpdateKpiContract<'a, U: UserContext> {
    user: &'a U,
    original: &'a Kpi,
}

impl<'a, U: UserContext> UpdateKpiContract<'a, U> {
    pub fn new(user: &'a U, original: &'a Kpi) -> Self {
        Self { user, original }
    }

    /// Attributes the update touches, keyed by their wire names
    pub fn changes(&self, updated: &Kpi) -> ChangeTracker {
        let before = serde_json::to_value(self.original).unwrap_or_default();
        let after = serde_json::to_value(updated).unwrap_or_default();
        ChangeTracker::between(&before, &after)
    }
}

impl<'a, U: UserContext> Contract<Kpi> for UpdateKpiContract<'a, U> {
    fn validate(&self, kpi: &Kpi) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        require_permission(self.user, PermissionModule::Kpi, PermissionAction::Edit, &mut errors);

        if let Err(base_errors) = KpiBaseContract.validate(kpi) {
            errors.merge(base_errors);
        }

        for attribute in self.changes(kpi).changed_attributes() {
            if !self.is_writable(attribute) {
                errors.add(attribute, "can't be changed");
            }
        }

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        matches!(
            attribute,
            "name"
                | "description"
                | "businessUnitId"
                | "ownerId"
                | "frequency"
                | "type"
                | "unit"
                | "goal"
                | "weight"
                | "updatedAt"
        )
    }
}
