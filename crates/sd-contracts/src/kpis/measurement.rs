//! Contract for recording KPI measurements

use sd_core::error::ValidationErrors;
use sd_models::{MeasurementEntry, PermissionAction, PermissionModule};

use crate::base::{require_permission, Contract, UserContext, ValidationResult};

pub struct MeasurementContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> MeasurementContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<MeasurementEntry> for MeasurementContract<'a, U> {
    fn validate(&self, entry: &MeasurementEntry) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        require_permission(self.user, PermissionModule::Kpi, PermissionAction::Edit, &mut errors);

        if !entry.value.is_finite() {
            errors.add("value", "must be a number");
        }
        if entry.comment.chars().count() > 1000 {
            errors.add("comment", "is too long (maximum is 1000 characters)");
        }

        errors.into_result()
    }
}
