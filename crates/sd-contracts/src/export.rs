//! Report export contract

use sd_core::error::ValidationErrors;
use sd_models::{PermissionAction, PermissionModule};

use crate::base::{require_permission, Contract, UserContext, ValidationResult};

/// Any report may be exported by a holder of REPORT/EXPORT
pub struct ExportContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> ExportContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext, T> Contract<T> for ExportContract<'a, U> {
    fn validate(&self, _report: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        require_permission(self.user, PermissionModule::Report, PermissionAction::Export, &mut errors);
        errors.into_result()
    }
}
