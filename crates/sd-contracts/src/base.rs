//! Base contract system

use sd_core::error::ValidationErrors;
use sd_core::traits::Id;
use sd_models::{PermissionAction, PermissionModule};
use std::collections::BTreeSet;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Acting user as seen by contracts
pub trait UserContext: Send + Sync {
    fn id(&self) -> Id;
    fn is_anonymous(&self) -> bool;
    fn allowed(&self, module: PermissionModule, action: PermissionAction) -> bool;
}

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;

    /// Check if an attribute is writable
    fn is_writable(&self, _attribute: &str) -> bool {
        true
    }
}

/// Add a base error unless `user` holds `action` on `module`
pub fn require_permission<U: UserContext + ?Sized>(
    user: &U,
    module: PermissionModule,
    action: PermissionAction,
    errors: &mut ValidationErrors,
) {
    if user.is_anonymous() || !user.allowed(module, action) {
        errors.add_base(format!(
            "You are not authorized to {} {}",
            action.as_str().to_lowercase(),
            module.as_str()
        ));
    }
}

pub fn validate_not_blank(field: &str, value: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(field, "can't be blank");
    } else if value.chars().count() > 255 {
        errors.add(field, "is too long (maximum is 255 characters)");
    }
}

pub fn validate_weight(weight: f64, errors: &mut ValidationErrors) {
    if !weight.is_finite() || !(0.0..=100.0).contains(&weight) {
        errors.add("weight", "must be between 0 and 100");
    }
}

/// Attributes that differ between two versions of an entity
#[derive(Debug, Default, Clone)]
pub struct ChangeTracker {
    changed_attributes: BTreeSet<String>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare the top-level fields of two serialized snapshots
    pub fn between(before: &serde_json::Value, after: &serde_json::Value) -> Self {
        let mut tracker = Self::new();
        let empty = serde_json::Map::new();
        let before = before.as_object().unwrap_or(&empty);
        let after = after.as_object().unwrap_or(&empty);

        for key in before.keys().chain(after.keys()) {
            if before.get(key) != after.get(key) {
                tracker.mark_changed(key.as_str());
            }
        }
        tracker
    }

    pub fn mark_changed(&mut self, attribute: impl Into<String>) {
        self.changed_attributes.insert(attribute.into());
    }

    pub fn is_changed(&self, attribute: &str) -> bool {
        self.changed_attributes.contains(attribute)
    }

    pub fn is_empty(&self) -> bool {
        self.changed_attributes.is_empty()
    }

    pub fn changed_attributes(&self) -> impl Iterator<Item = &str> {
        self.changed_attributes.iter().map(String::as_str)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::MockUser;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_tracker() {
        let mut tracker = ChangeTracker::new();
        assert!(!tracker.is_changed("name"));

        tracker.mark_changed("name");
        assert!(tracker.is_changed("name"));
        assert!(!tracker.is_changed("goal"));
    }

    #[test]
    fn test_change_tracker_between_snapshots() {
        let before = json!({ "name": "Revenue", "goal": 10.0, "unit": "BRL" });
        let after = json!({ "name": "Revenue", "goal": 12.0, "owner": 3 });
        let tracker = ChangeTracker::between(&before, &after);

        let changed: Vec<&str> = tracker.changed_attributes().collect();
        assert_eq!(changed, vec!["goal", "owner", "unit"]);
    }

    #[test]
    fn test_require_permission() {
        let viewer = MockUser::with(PermissionModule::Kpi, &[PermissionAction::View]);
        let mut errors = ValidationErrors::new();

        require_permission(&viewer, PermissionModule::Kpi, PermissionAction::View, &mut errors);
        assert!(errors.is_empty());

        require_permission(&viewer, PermissionModule::Kpi, PermissionAction::Edit, &mut errors);
        assert!(errors.has_base_errors());
    }

    #[test]
    fn test_weight_bounds() {
        for (weight, ok) in [(0.0, true), (100.0, true), (-1.0, false), (100.5, false), (f64::NAN, false)] {
            let mut errors = ValidationErrors::new();
            validate_weight(weight, &mut errors);
            assert_eq!(errors.is_empty(), ok, "weight {}", weight);
        }
    }
}
