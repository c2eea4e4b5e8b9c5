//! Audit entry model

use chrono::{DateTime, Utc};
use sd_core::traits::Id;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Kind of entity an audit entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEntityType {
    Kpi,
    Okr,
    ActionPlan,
    Report,
}

impl AuditEntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kpi => "KPI",
            Self::Okr => "OKR",
            Self::ActionPlan => "ACTION_PLAN",
            Self::Report => "REPORT",
        }
    }
}

impl fmt::Display for AuditEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Export,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Export => "EXPORT",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit record
///
/// Entries are immutable once appended. Update entries carry one changed
/// field each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Assigned by the store on append
    pub id: Option<Id>,
    pub entity_id: Id,
    pub entity_type: AuditEntityType,
    pub action: AuditAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub user_id: Id,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(entity_type: AuditEntityType, entity_id: Id, action: AuditAction, user_id: Id) -> Self {
        Self {
            id: None,
            entity_id,
            entity_type,
            action,
            field: None,
            old_value: None,
            new_value: None,
            reason: None,
            user_id,
            timestamp: Utc::now(),
        }
    }

    pub fn with_field(
        mut self,
        field: impl Into<String>,
        old_value: Option<JsonValue>,
        new_value: Option<JsonValue>,
    ) -> Self {
        self.field = Some(field.into());
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }

    pub fn with_new_value(mut self, value: JsonValue) -> Self {
        self.new_value = Some(value);
        self
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }

    pub fn concerns(&self, entity_type: AuditEntityType, entity_id: Id) -> bool {
        self.entity_type == entity_type && self.entity_id == entity_id
    }

    /// One-line human readable summary
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} {} #{} by user {}",
            self.action, self.entity_type, self.entity_id, self.user_id
        );
        if let Some(field) = &self.field {
            let show = |v: &Option<JsonValue>| v.as_ref().map_or("-".to_string(), |v| v.to_string());
            line.push_str(&format!(
                ": {} {} -> {}",
                field,
                show(&self.old_value),
                show(&self.new_value)
            ));
        }
        if let Some(reason) = &self.reason {
            line.push_str(&format!(" ({})", reason));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_for_field_change() {
        let entry = AuditEntry::new(AuditEntityType::Kpi, 3, AuditAction::Update, 9)
            .with_field("goal", Some(json!(100.0)), Some(json!(120.0)))
            .with_reason(Some("replanned".into()));

        assert_eq!(entry.summary(), "UPDATE KPI #3 by user 9: goal 100.0 -> 120.0 (replanned)");
    }

    #[test]
    fn test_wire_format() {
        let entry = AuditEntry::new(AuditEntityType::ActionPlan, 1, AuditAction::Delete, 2);
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["entityType"], "ACTION_PLAN");
        assert_eq!(value["action"], "DELETE");
        assert!(value.get("field").is_none());
    }
}
