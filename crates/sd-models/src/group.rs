//! Group and business unit models
//!
//! Both carry the role ids their members inherit.

use chrono::{DateTime, Utc};
use sd_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Group entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Roles inherited by every member of the group
    #[serde(default)]
    pub role_ids: Vec<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Business unit entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUnit {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Parent unit in the organization chart
    #[serde(default)]
    pub parent_id: Option<Id>,

    /// Roles inherited by every member of the unit
    #[serde(default)]
    pub role_ids: Vec<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Group {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            role_ids: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Add an inherited role, ignoring duplicates
    pub fn add_role(&mut self, role_id: Id) {
        if !self.role_ids.contains(&role_id) {
            self.role_ids.push(role_id);
        }
    }

    pub fn remove_role(&mut self, role_id: Id) {
        self.role_ids.retain(|&id| id != role_id);
    }
}

impl BusinessUnit {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            parent_id: None,
            role_ids: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_parent(mut self, parent_id: Id) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Add an inherited role, ignoring duplicates
    pub fn add_role(&mut self, role_id: Id) {
        if !self.role_ids.contains(&role_id) {
            self.role_ids.push(role_id);
        }
    }

    pub fn remove_role(&mut self, role_id: Id) {
        self.role_ids.retain(|&id| id != role_id);
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Identifiable for Group {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Group {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Group {
    const TYPE_NAME: &'static str = "Group";
}

impl Identifiable for BusinessUnit {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for BusinessUnit {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for BusinessUnit {
    const TYPE_NAME: &'static str = "BusinessUnit";
}
