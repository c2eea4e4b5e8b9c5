//! Dataset snapshot files
//!
//! One JSON document holds the strategy records and the access catalog.

use anyhow::Context;
use sd_auth::RoleDirectory;
use sd_core::traits::Id;
use sd_models::{ActionPlan, BusinessUnit, Group, Kpi, Okr, RoleDefinition, User};
use sd_services::StrategySnapshot;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub kpis: Vec<Kpi>,
    #[serde(default)]
    pub okrs: Vec<Okr>,
    #[serde(default)]
    pub action_plans: Vec<ActionPlan>,
    #[serde(default)]
    pub roles: Vec<RoleDefinition>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub business_units: Vec<BusinessUnit>,
    #[serde(default)]
    pub users: Vec<User>,
}

impl Dataset {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading dataset {}", path.display()))?;
        let dataset = Self::parse(&raw).with_context(|| format!("parsing dataset {}", path.display()))?;
        info!(
            path = %path.display(),
            kpis = dataset.kpis.len(),
            okrs = dataset.okrs.len(),
            users = dataset.users.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Split into strategy records and the role directory
    pub fn split(self) -> (StrategySnapshot, RoleDirectory, Vec<User>) {
        let snapshot = StrategySnapshot {
            kpis: self.kpis,
            okrs: self.okrs,
            action_plans: self.action_plans,
        };
        let directory = RoleDirectory::new(self.roles, self.groups, self.business_units);
        (snapshot, directory, self.users)
    }
}

pub fn find_user(users: &[User], id: Id) -> Option<&User> {
    users.iter().find(|u| u.id == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_models::{PermissionAction, PermissionModule};

    const SAMPLE: &str = r#"{
        "kpis": [{ "id": 1, "name": "Revenue", "goal": 100, "weight": 40 }],
        "okrs": [{ "id": 1, "title": "Grow", "startYear": 2024, "endYear": 2024, "kpiIds": [1] }],
        "roles": [{ "id": 3, "name": "Analyst", "permissions": { "KPI": ["VIEW"] } }],
        "businessUnits": [{ "id": 8, "name": "Sales", "roleIds": [3] }],
        "users": [{ "id": 5, "name": "Bea", "email": "bea@example.com", "businessUnitIds": [8] }]
    }"#;

    #[test]
    fn test_parse_and_split() {
        let (snapshot, directory, users) = Dataset::parse(SAMPLE).unwrap().split();
        assert_eq!(snapshot.kpis.len(), 1);
        assert_eq!(snapshot.okrs[0].kpi_ids.len(), 1);
        assert!(snapshot.action_plans.is_empty());

        let bea = find_user(&users, 5);
        assert!(directory.check_permission(bea, PermissionModule::Kpi, PermissionAction::View));
        assert!(!directory.check_permission(bea, PermissionModule::Kpi, PermissionAction::Edit));
        assert!(find_user(&users, 6).is_none());
    }

    #[test]
    fn test_empty_document() {
        let dataset = Dataset::parse("{}").unwrap();
        assert!(dataset.kpis.is_empty());
        assert!(dataset.users.is_empty());
    }
}
