//! Soft-delete and restore contracts

use sd_core::error::ValidationErrors;
use sd_core::traits::{Entity, SoftDeletable};
use sd_models::{PermissionAction, PermissionModule};

use crate::base::{require_permission, Contract, UserContext, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Delete,
    Restore,
}

/// Contract guarding soft deletion of any entity in `module`
pub struct DeletionContract<'a, U: UserContext> {
    user: &'a U,
    module: PermissionModule,
    removal: Removal,
}

impl<'a, U: UserContext> DeletionContract<'a, U> {
    pub fn delete(user: &'a U, module: PermissionModule) -> Self {
        Self {
            user,
            module,
            removal: Removal::Delete,
        }
    }

    pub fn restore(user: &'a U, module: PermissionModule) -> Self {
        Self {
            user,
            module,
            removal: Removal::Restore,
        }
    }
}

impl<'a, U: UserContext, T: Entity + SoftDeletable> Contract<T> for DeletionContract<'a, U> {
    fn validate(&self, entity: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        require_permission(self.user, self.module, PermissionAction::Delete, &mut errors);

        match (self.removal, entity.is_deleted()) {
            (Removal::Delete, true) => {
                errors.add_base(format!("{} is already deleted", T::TYPE_NAME));
            }
            (Removal::Restore, false) => {
                errors.add_base(format!("{} is not deleted", T::TYPE_NAME));
            }
            _ => {}
        }

        errors.into_result()
    }
}
