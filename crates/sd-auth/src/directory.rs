//! Role directory and permission resolution
//!
//! A user may act when any of these grants the action:
//! - their per-user `extra_permissions`
//! - their direct role
//! - a role of any group they belong to
//! - a role of any business unit they belong to
//!
//! References to unknown roles, groups or business units grant nothing.

use sd_core::traits::Id;
use sd_models::{
    BusinessUnit, Group, PermissionAction, PermissionMatrix, PermissionModule, RoleDefinition, User,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Catalog of roles and of the groups and business units that carry them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "DirectorySnapshot", into = "DirectorySnapshot")]
pub struct RoleDirectory {
    roles: BTreeMap<Id, RoleDefinition>,
    groups: BTreeMap<Id, Group>,
    business_units: BTreeMap<Id, BusinessUnit>,
}

/// Wire shape: plain lists, as exported by the admin screens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectorySnapshot {
    #[serde(default)]
    roles: Vec<RoleDefinition>,
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    business_units: Vec<BusinessUnit>,
}

impl From<DirectorySnapshot> for RoleDirectory {
    fn from(snapshot: DirectorySnapshot) -> Self {
        RoleDirectory::new(snapshot.roles, snapshot.groups, snapshot.business_units)
    }
}

impl From<RoleDirectory> for DirectorySnapshot {
    fn from(directory: RoleDirectory) -> Self {
        DirectorySnapshot {
            roles: directory.roles.into_values().collect(),
            groups: directory.groups.into_values().collect(),
            business_units: directory.business_units.into_values().collect(),
        }
    }
}

impl RoleDirectory {
    /// Build a directory; records without an id are skipped
    pub fn new(
        roles: impl IntoIterator<Item = RoleDefinition>,
        groups: impl IntoIterator<Item = Group>,
        business_units: impl IntoIterator<Item = BusinessUnit>,
    ) -> Self {
        let mut directory = Self::default();
        for role in roles {
            directory.add_role(role);
        }
        for group in groups {
            directory.add_group(group);
        }
        for unit in business_units {
            directory.add_business_unit(unit);
        }
        directory
    }

    pub fn add_role(&mut self, role: RoleDefinition) {
        match role.id {
            Some(id) => {
                self.roles.insert(id, role);
            }
            None => debug!(name = %role.name, "Skipping unsaved role"),
        }
    }

    pub fn add_group(&mut self, group: Group) {
        match group.id {
            Some(id) => {
                self.groups.insert(id, group);
            }
            None => debug!(name = %group.name, "Skipping unsaved group"),
        }
    }

    pub fn add_business_unit(&mut self, unit: BusinessUnit) {
        match unit.id {
            Some(id) => {
                self.business_units.insert(id, unit);
            }
            None => debug!(name = %unit.name, "Skipping unsaved business unit"),
        }
    }

    pub fn role(&self, id: Id) -> Option<&RoleDefinition> {
        self.roles.get(&id)
    }

    pub fn group(&self, id: Id) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn business_unit(&self, id: Id) -> Option<&BusinessUnit> {
        self.business_units.get(&id)
    }

    pub fn roles(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.roles.values()
    }

    /// Every role id the user holds: direct, through groups and through business units
    pub fn candidate_role_ids(&self, user: &User) -> BTreeSet<Id> {
        let mut ids: BTreeSet<Id> = user.role_id.into_iter().collect();

        for group_id in &user.group_ids {
            match self.groups.get(group_id) {
                Some(group) => ids.extend(&group.role_ids),
                None => debug!(user_id = ?user.id, group_id, "User references unknown group"),
            }
        }

        for bu_id in &user.business_unit_ids {
            match self.business_units.get(bu_id) {
                Some(unit) => ids.extend(&unit.role_ids),
                None => debug!(user_id = ?user.id, bu_id, "User references unknown business unit"),
            }
        }

        ids
    }

    fn resolved_roles<'a>(&'a self, user: &'a User) -> impl Iterator<Item = &'a RoleDefinition> + 'a {
        self.candidate_role_ids(user)
            .into_iter()
            .filter_map(move |role_id| {
                let role = self.roles.get(&role_id);
                if role.is_none() {
                    debug!(user_id = ?user.id, role_id, "Skipping unknown role");
                }
                role
            })
    }

    /// Decide whether `user` may perform `action` on `module`
    pub fn check_permission(
        &self,
        user: Option<&User>,
        module: PermissionModule,
        action: PermissionAction,
    ) -> bool {
        let Some(user) = user else {
            return false;
        };

        if user.extra_permissions.allows(module, action) {
            return true;
        }

        self.resolved_roles(user)
            .any(|role| role.grants(module, action))
    }

    /// Everything the user may do, merged across all of their grants
    pub fn effective_permissions(&self, user: &User) -> PermissionMatrix {
        self.resolved_roles(user)
            .fold(user.extra_permissions, |acc, role| acc.union(&role.permissions))
    }
}

/// Free-function form of [`RoleDirectory::check_permission`]
pub fn check_permission(
    directory: &RoleDirectory,
    user: Option<&User>,
    module: PermissionModule,
    action: PermissionAction,
) -> bool {
    directory.check_permission(user, module, action)
}
