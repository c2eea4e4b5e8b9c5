//! Resolved user context

use sd_contracts::UserContext;
use sd_core::traits::Id;
use sd_models::{PermissionAction, PermissionMatrix, PermissionModule, User};

use crate::directory::RoleDirectory;

/// Current user with permissions resolved once against a directory
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub is_anonymous: bool,
    permissions: PermissionMatrix,
}

impl CurrentUser {
    /// Resolve a user's effective permissions
    pub fn resolve(directory: &RoleDirectory, user: &User) -> Self {
        Self {
            id: user.audit_id(),
            name: user.name.clone(),
            email: user.email.clone(),
            is_anonymous: false,
            permissions: directory.effective_permissions(user),
        }
    }

    /// Create a user with an explicit permission matrix
    pub fn with_permissions(id: Id, name: impl Into<String>, permissions: PermissionMatrix) -> Self {
        Self {
            id,
            name: name.into(),
            email: String::new(),
            is_anonymous: false,
            permissions,
        }
    }

    /// Create an anonymous user; it is denied everything
    pub fn anonymous() -> Self {
        Self {
            id: 0,
            name: "anonymous".to_string(),
            email: String::new(),
            is_anonymous: true,
            permissions: PermissionMatrix::new(),
        }
    }

    /// Create a user holding every permission
    pub fn admin(id: Id, name: impl Into<String>) -> Self {
        Self::with_permissions(id, name, PermissionMatrix::full())
    }

    pub fn permissions(&self) -> &PermissionMatrix {
        &self.permissions
    }

    /// Modules the user may at least view, for building menus
    pub fn visible_modules(&self) -> Vec<PermissionModule> {
        PermissionModule::ALL
            .into_iter()
            .filter(|&m| self.permissions.allows(m, PermissionAction::View))
            .collect()
    }
}

impl UserContext for CurrentUser {
    fn id(&self) -> Id {
        self.id
    }

    fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    fn allowed(&self, module: PermissionModule, action: PermissionAction) -> bool {
        !self.is_anonymous && self.permissions.allows(module, action)
    }
}
