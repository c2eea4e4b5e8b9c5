//! Role model
//!
//! Roles bundle permissions per module. Users reach roles directly, through
//! their groups, and through their business units.

use chrono::{DateTime, Utc};
use sd_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Area of the dashboard a permission applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionModule {
    Okr,
    Kpi,
    Report,
    Settings,
}

impl PermissionModule {
    pub const ALL: [PermissionModule; 4] = [Self::Okr, Self::Kpi, Self::Report, Self::Settings];

    fn index(self) -> usize {
        match self {
            Self::Okr => 0,
            Self::Kpi => 1,
            Self::Report => 2,
            Self::Settings => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Okr => "OKR",
            Self::Kpi => "KPI",
            Self::Report => "REPORT",
            Self::Settings => "SETTINGS",
        }
    }
}

/// Operation a permission grants within a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionAction {
    View,
    Create,
    Edit,
    Delete,
    Export,
}

impl PermissionAction {
    pub const ALL: [PermissionAction; 5] = [
        Self::View,
        Self::Create,
        Self::Edit,
        Self::Delete,
        Self::Export,
    ];

    fn bit(self) -> u8 {
        match self {
            Self::View => 1 << 0,
            Self::Create => 1 << 1,
            Self::Edit => 1 << 2,
            Self::Delete => 1 << 3,
            Self::Export => 1 << 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Create => "CREATE",
            Self::Edit => "EDIT",
            Self::Delete => "DELETE",
            Self::Export => "EXPORT",
        }
    }
}

impl fmt::Display for PermissionModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPermission(pub String);

impl fmt::Display for UnknownPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown permission value '{}'", self.0)
    }
}

impl std::error::Error for UnknownPermission {}

impl FromStr for PermissionModule {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

impl FromStr for PermissionAction {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// Wire shape of a permission matrix: module -> allowed actions
pub type PermissionMap = BTreeMap<PermissionModule, BTreeSet<PermissionAction>>;

/// Allowed actions per module, one bitset per module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "PermissionMap", into = "PermissionMap")]
pub struct PermissionMatrix {
    bits: [u8; 4],
}

impl PermissionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every action on every module
    pub fn full() -> Self {
        let mut matrix = Self::new();
        for module in PermissionModule::ALL {
            matrix.grant_all(module);
        }
        matrix
    }

    pub fn with(mut self, module: PermissionModule, actions: &[PermissionAction]) -> Self {
        for &action in actions {
            self.grant(module, action);
        }
        self
    }

    pub fn grant(&mut self, module: PermissionModule, action: PermissionAction) {
        self.bits[module.index()] |= action.bit();
    }

    pub fn grant_all(&mut self, module: PermissionModule) {
        for action in PermissionAction::ALL {
            self.grant(module, action);
        }
    }

    pub fn revoke(&mut self, module: PermissionModule, action: PermissionAction) {
        self.bits[module.index()] &= !action.bit();
    }

    pub fn allows(&self, module: PermissionModule, action: PermissionAction) -> bool {
        self.bits[module.index()] & action.bit() != 0
    }

    /// Actions granted on a module, in declaration order
    pub fn actions(&self, module: PermissionModule) -> Vec<PermissionAction> {
        PermissionAction::ALL
            .into_iter()
            .filter(|&a| self.allows(module, a))
            .collect()
    }

    pub fn union(&self, other: &PermissionMatrix) -> PermissionMatrix {
        let mut bits = self.bits;
        for (slot, other_bits) in bits.iter_mut().zip(other.bits) {
            *slot |= other_bits;
        }
        PermissionMatrix { bits }
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }
}

impl From<PermissionMap> for PermissionMatrix {
    fn from(map: PermissionMap) -> Self {
        let mut matrix = PermissionMatrix::new();
        for (module, actions) in map {
            for action in actions {
                matrix.grant(module, action);
            }
        }
        matrix
    }
}

impl From<PermissionMatrix> for PermissionMap {
    fn from(matrix: PermissionMatrix) -> Self {
        PermissionModule::ALL
            .into_iter()
            .filter_map(|module| {
                let actions: BTreeSet<_> = matrix.actions(module).into_iter().collect();
                (!actions.is_empty()).then_some((module, actions))
            })
            .collect()
    }
}

/// Role definition entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinition {
    pub id: Option<Id>,

    /// Role name (unique)
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Permissions granted by this role
    #[serde(default)]
    pub permissions: PermissionMatrix,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for RoleDefinition {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for RoleDefinition {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for RoleDefinition {
    const TYPE_NAME: &'static str = "Role";
}

impl RoleDefinition {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            description: None,
            permissions: PermissionMatrix::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_permissions(mut self, permissions: PermissionMatrix) -> Self {
        self.permissions = permissions;
        self
    }

    /// Check if role grants an action on a module
    pub fn grants(&self, module: PermissionModule, action: PermissionAction) -> bool {
        self.permissions.allows(module, action)
    }

    /// Standard role names
    pub const ADMIN: &'static str = "Administrator";
    pub const MANAGER: &'static str = "Manager";
    pub const VIEWER: &'static str = "Viewer";
}

#[cfg(test)]
mod tests {
    use super::*;
    use PermissionAction::*;
    use PermissionModule::*;

    #[test]
    fn test_matrix_grant_and_revoke() {
        let mut m = PermissionMatrix::new();
        assert!(m.is_empty());

        m.grant(Kpi, View);
        m.grant(Kpi, Edit);
        assert!(m.allows(Kpi, View));
        assert!(m.allows(Kpi, Edit));
        assert!(!m.allows(Okr, View));

        m.revoke(Kpi, Edit);
        assert!(!m.allows(Kpi, Edit));
        assert_eq!(m.actions(Kpi), vec![View]);
    }

    #[test]
    fn test_matrix_union() {
        let a = PermissionMatrix::new().with(Okr, &[View]);
        let b = PermissionMatrix::new().with(Okr, &[Edit]).with(Report, &[Export]);
        let u = a.union(&b);
        assert!(u.allows(Okr, View));
        assert!(u.allows(Okr, Edit));
        assert!(u.allows(Report, Export));
        assert!(!u.allows(Settings, View));
    }

    #[test]
    fn test_matrix_json_shape() {
        let m = PermissionMatrix::new().with(Kpi, &[View, Export]);
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json, serde_json::json!({ "KPI": ["VIEW", "EXPORT"] }));

        let back: PermissionMatrix =
            serde_json::from_value(serde_json::json!({ "OKR": ["DELETE"] })).unwrap();
        assert!(back.allows(Okr, Delete));
        assert!(!back.allows(Okr, View));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("okr".parse::<PermissionModule>(), Ok(Okr));
        assert_eq!("Export".parse::<PermissionAction>(), Ok(Export));
        assert!("approve".parse::<PermissionAction>().is_err());
    }

    #[test]
    fn test_role_grants() {
        let role = RoleDefinition::new(1, RoleDefinition::VIEWER)
            .with_permissions(PermissionMatrix::new().with(Okr, &[View]).with(Kpi, &[View]));
        assert!(role.grants(Okr, View));
        assert!(!role.grants(Okr, Edit));
    }

    #[test]
    fn test_full_matrix() {
        let m = PermissionMatrix::full();
        for module in PermissionModule::ALL {
            for action in PermissionAction::ALL {
                assert!(m.allows(module, action));
            }
        }
    }
}
