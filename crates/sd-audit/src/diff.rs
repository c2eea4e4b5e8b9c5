//! Field-level differences between two entity snapshots

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

/// Bookkeeping fields that change on every write and are not audited
const IGNORED_FIELDS: &[&str] = &["updatedAt", "lastUpdated"];

/// One top-level field that differs between two snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    /// `None` when the field was absent before
    pub old_value: Option<JsonValue>,
    /// `None` when the field was removed
    pub new_value: Option<JsonValue>,
}

/// Compare the top-level fields of two serialized entities
///
/// Nested values are compared as a whole. Results are ordered by field name.
/// Non-object snapshots are compared under the field name `value`.
pub fn field_changes(before: &JsonValue, after: &JsonValue) -> Vec<FieldChange> {
    let (Some(old), Some(new)) = (before.as_object(), after.as_object()) else {
        if before == after {
            return Vec::new();
        }
        return vec![FieldChange {
            field: "value".to_string(),
            old_value: Some(before.clone()),
            new_value: Some(after.clone()),
        }];
    };

    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    keys.into_iter()
        .filter(|key| !IGNORED_FIELDS.contains(&key.as_str()))
        .filter_map(|key| {
            let old_value = old.get(key);
            let new_value = new.get(key);
            (old_value != new_value).then(|| FieldChange {
                field: key.clone(),
                old_value: old_value.cloned(),
                new_value: new_value.cloned(),
            })
        })
        .collect()
}
