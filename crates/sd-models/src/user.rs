//! User model
//!
//! Authentication is delegated to an external identity provider; this record
//! only carries what authorization needs.

use chrono::{DateTime, Utc};
use sd_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::role::PermissionMatrix;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    /// Direct role
    #[serde(default)]
    pub role_id: Option<Id>,

    #[serde(default)]
    pub group_ids: Vec<Id>,

    #[serde(default)]
    pub business_unit_ids: Vec<Id>,

    /// Per-user grants on top of everything the user's roles allow
    #[serde(default)]
    pub extra_permissions: PermissionMatrix,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            email: String::new(),
            role_id: None,
            group_ids: Vec::new(),
            business_unit_ids: Vec::new(),
            extra_permissions: PermissionMatrix::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for User {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for User {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for User {
    const TYPE_NAME: &'static str = "User";
}

impl User {
    pub fn new(id: Id, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role_id: Id) -> Self {
        self.role_id = Some(role_id);
        self
    }

    pub fn with_groups(mut self, group_ids: impl IntoIterator<Item = Id>) -> Self {
        self.group_ids.extend(group_ids);
        self
    }

    pub fn with_business_units(mut self, bu_ids: impl IntoIterator<Item = Id>) -> Self {
        self.business_unit_ids.extend(bu_ids);
        self
    }

    pub fn with_extra_permissions(mut self, permissions: PermissionMatrix) -> Self {
        self.extra_permissions = permissions;
        self
    }

    /// Id used for audit attribution; 0 for unsaved records
    pub fn audit_id(&self) -> Id {
        self.id.unwrap_or(0)
    }
}
