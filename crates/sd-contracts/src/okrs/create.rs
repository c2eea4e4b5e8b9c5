//! Create contract for OKRs

use sd_core::error::ValidationErrors;
use sd_models::{Okr, PermissionAction, PermissionModule};

use super::base::OkrBaseContract;
use crate::base::{require_permission, Contract, UserContext, ValidationResult};

pub struct CreateOkrContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> CreateOkrContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext> Contract<Okr> for CreateOkrContract<'a, U> {
    fn validate(&self, okr: &Okr) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        require_permission(self.user, PermissionModule::Okr, PermissionAction::Create, &mut errors);

        if let Err(base_errors) = OkrBaseContract.validate(okr) {
            errors.merge(base_errors);
        }

        errors.into_result()
    }
}
