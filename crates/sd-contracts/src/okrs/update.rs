//! Update contract for OKRs

use sd_core::error::ValidationErrors;
use sd_models::{Okr, PermissionAction, PermissionModule};

use super::base::OkrBaseContract;
use crate::base::{require_permission, ChangeTracker, Contract, UserContext, ValidationResult};

/// Contract for editing an objective's definition
///
/// Progress and status are derived, and KPI links have their own commands.
pub struct UpdateOkrContract<'a, U: UserContext> {
    user: &'a U,
    original: &'a Okr,
}

impl<'a, U: UserContext> UpdateOkrContract<'a, U> {
    pub fn new(user: &'a U, original: &'a Okr) -> Self {
        Self { user, original }
    }

    pub fn changes(&self, updated: &Okr) -> ChangeTracker {
        let before = serde_json::to_value(self.original).unwrap_or_default();
        let after = serde_json::to_value(updated).unwrap_or_default();
        ChangeTracker::between(&before, &after)
    }
}

impl<'a, U: UserContext> Contract<Okr> for UpdateOkrContract<'a, U> {
    fn validate(&self, okr: &Okr) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        require_permission(self.user, PermissionModule::Okr, PermissionAction::Edit, &mut errors);

        if let Err(base_errors) = OkrBaseContract.validate(okr) {
            errors.merge(base_errors);
        }

        for attribute in self.changes(okr).changed_attributes() {
            if !self.is_writable(attribute) {
                errors.add(attribute, "can't be changed");
            }
        }

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        matches!(
            attribute,
            "title"
                | "description"
                | "businessUnitId"
                | "scope"
                | "startYear"
                | "endYear"
                | "weight"
                | "ownerId"
                | "updatedAt"
        )
    }
}
