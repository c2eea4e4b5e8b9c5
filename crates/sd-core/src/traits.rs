//! Core traits shared by every domain entity

use chrono::{DateTime, Utc};

/// Primary key type
pub type Id = i64;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Option<Id>;
    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
    fn is_new_record(&self) -> bool {
        !self.is_persisted()
    }
}

/// Trait for entities with timestamps (created_at, updated_at)
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

/// Trait for soft-deletable entities
///
/// Deleted entities stay in the store flagged with `deleted_at` and can be restored.
pub trait SoftDeletable {
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    fn mark_deleted(&mut self, at: DateTime<Utc>);
    fn restore(&mut self);
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// Base trait for all domain entities
pub trait Entity: Identifiable + Timestamped + Send + Sync {
    /// Human-readable type name for error messages and audit entries
    const TYPE_NAME: &'static str;
}
