//! Audit Service
//!
//! Records audit entries through a pluggable store and notifies listeners.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use sd_core::error::SdError;
use sd_core::traits::Id;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

use crate::diff::field_changes;
use crate::entry::{AuditAction, AuditEntityType, AuditEntry};

/// Audit service errors
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit entry not found: {0}")]
    NotFound(Id),
    #[error("Store error: {0}")]
    Store(String),
    #[error("Could not serialize snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<AuditError> for SdError {
    fn from(err: AuditError) -> Self {
        SdError::Audit(err.to_string())
    }
}

pub type AuditResult<T> = Result<T, AuditError>;

/// Append-only storage for audit entries
///
/// There is deliberately no way to change or remove an entry.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Store an entry and return its assigned id
    async fn append(&self, entry: &AuditEntry) -> AuditResult<Id>;

    async fn get(&self, id: Id) -> AuditResult<Option<AuditEntry>>;

    /// Entries for one entity, oldest first
    async fn for_entity(&self, entity_type: AuditEntityType, entity_id: Id) -> AuditResult<Vec<AuditEntry>>;

    /// Entries written by one user, oldest first
    async fn by_user(&self, user_id: Id) -> AuditResult<Vec<AuditEntry>>;

    async fn all(&self) -> AuditResult<Vec<AuditEntry>>;
}

/// Audit service for recording and reading the trail
pub struct AuditService {
    store: Arc<dyn AuditStore>,
    event_handlers: Vec<Box<dyn Fn(&AuditEntry) + Send + Sync>>,
}

impl AuditService {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self {
            store,
            event_handlers: Vec::new(),
        }
    }

    /// Service backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryAuditStore::new()))
    }

    /// Register a handler called after every appended entry
    pub fn on_recorded<F>(&mut self, handler: F)
    where
        F: Fn(&AuditEntry) + Send + Sync + 'static,
    {
        self.event_handlers.push(Box::new(handler));
    }

    /// Record creation, storing the full snapshot as the new value
    pub async fn record_create<T: Serialize + ?Sized>(
        &self,
        entity_type: AuditEntityType,
        entity_id: Id,
        user_id: Id,
        snapshot: &T,
    ) -> AuditResult<AuditEntry> {
        let entry = AuditEntry::new(entity_type, entity_id, AuditAction::Create, user_id)
            .with_new_value(serde_json::to_value(snapshot)?);
        self.append(entry).await
    }

    /// Record one update entry per changed top-level field
    ///
    /// Returns no entries when the snapshots are equal.
    pub async fn record_update<T: Serialize + ?Sized>(
        &self,
        entity_type: AuditEntityType,
        entity_id: Id,
        user_id: Id,
        before: &T,
        after: &T,
        reason: Option<String>,
    ) -> AuditResult<Vec<AuditEntry>> {
        let before = serde_json::to_value(before)?;
        let after = serde_json::to_value(after)?;

        let mut recorded = Vec::new();
        for change in field_changes(&before, &after) {
            let entry = AuditEntry::new(entity_type, entity_id, AuditAction::Update, user_id)
                .with_field(change.field, change.old_value, change.new_value)
                .with_reason(reason.clone());
            recorded.push(self.append(entry).await?);
        }
        Ok(recorded)
    }

    pub async fn record_delete(
        &self,
        entity_type: AuditEntityType,
        entity_id: Id,
        user_id: Id,
        reason: Option<String>,
    ) -> AuditResult<AuditEntry> {
        let entry = AuditEntry::new(entity_type, entity_id, AuditAction::Delete, user_id)
            .with_reason(reason);
        self.append(entry).await
    }

    /// Record that a report left the system
    pub async fn record_export(
        &self,
        entity_type: AuditEntityType,
        entity_id: Id,
        user_id: Id,
        format: &str,
    ) -> AuditResult<AuditEntry> {
        let entry = AuditEntry::new(entity_type, entity_id, AuditAction::Export, user_id)
            .with_field("format", None, Some(JsonValue::String(format.to_string())));
        self.append(entry).await
    }

    /// Full trail of one entity, oldest first
    pub async fn history(&self, entity_type: AuditEntityType, entity_id: Id) -> AuditResult<Vec<AuditEntry>> {
        self.store.for_entity(entity_type, entity_id).await
    }

    pub async fn by_user(&self, user_id: Id) -> AuditResult<Vec<AuditEntry>> {
        self.store.by_user(user_id).await
    }

    pub async fn all(&self) -> AuditResult<Vec<AuditEntry>> {
        self.store.all().await
    }

    pub async fn get(&self, id: Id) -> AuditResult<AuditEntry> {
        self.store.get(id).await?.ok_or(AuditError::NotFound(id))
    }

    async fn append(&self, mut entry: AuditEntry) -> AuditResult<AuditEntry> {
        let id = self.store.append(&entry).await?;
        entry.id = Some(id);
        debug!(
            audit_id = id,
            action = %entry.action,
            entity_type = %entry.entity_type,
            entity_id = entry.entity_id,
            user_id = entry.user_id,
            "Audit entry recorded"
        );
        self.emit_event(&entry);
        Ok(entry)
    }

    fn emit_event(&self, entry: &AuditEntry) {
        for handler in &self.event_handlers {
            handler(entry);
        }
    }
}

/// In-memory audit store
pub struct MemoryAuditStore {
    entries: RwLock<Vec<AuditEntry>>,
    next_id: AtomicI64,
}

impl Default for MemoryAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn select(&self, keep: impl Fn(&AuditEntry) -> bool) -> Vec<AuditEntry> {
        self.entries.read().iter().filter(|e| keep(e)).cloned().collect()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: &AuditEntry) -> AuditResult<Id> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut entry = entry.clone();
        entry.id = Some(id);
        self.entries.write().push(entry);
        Ok(id)
    }

    async fn get(&self, id: Id) -> AuditResult<Option<AuditEntry>> {
        Ok(self.entries.read().iter().find(|e| e.id == Some(id)).cloned())
    }

    async fn for_entity(&self, entity_type: AuditEntityType, entity_id: Id) -> AuditResult<Vec<AuditEntry>> {
        Ok(self.select(|e| e.concerns(entity_type, entity_id)))
    }

    async fn by_user(&self, user_id: Id) -> AuditResult<Vec<AuditEntry>> {
        Ok(self.select(|e| e.user_id == user_id))
    }

    async fn all(&self) -> AuditResult<Vec<AuditEntry>> {
        Ok(self.entries.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_record_create() {
        let service = AuditService::in_memory();
        let entry = service
            .record_create(AuditEntityType::Kpi, 1, 10, &json!({ "name": "Revenue" }))
            .await
            .unwrap();

        assert_eq!(entry.id, Some(1));
        assert_eq!(entry.action, AuditAction::Create);
        assert_eq!(entry.new_value, Some(json!({ "name": "Revenue" })));
    }

    #[tokio::test]
    async fn test_record_update_one_entry_per_field() {
        let service = AuditService::in_memory();
        let before = json!({ "name": "Revenue", "goal": 100.0, "weight": 40.0 });
        let after = json!({ "name": "Net revenue", "goal": 120.0, "weight": 40.0 });

        let entries = service
            .record_update(AuditEntityType::Kpi, 1, 10, &before, &after, Some("replan".into()))
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].field.as_deref(), Some("goal"));
        assert_eq!(entries[1].field.as_deref(), Some("name"));
        assert!(entries.iter().all(|e| e.reason.as_deref() == Some("replan")));
    }

    #[tokio::test]
    async fn test_record_update_without_changes() {
        let service = AuditService::in_memory();
        let snapshot = json!({ "goal": 1 });
        let entries = service
            .record_update(AuditEntityType::Okr, 1, 10, &snapshot, &snapshot, None)
            .await
            .unwrap();

        assert!(entries.is_empty());
        assert!(service.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_and_by_user() {
        let service = AuditService::in_memory();
        service
            .record_create(AuditEntityType::Kpi, 1, 10, &json!({}))
            .await
            .unwrap();
        service
            .record_create(AuditEntityType::Okr, 1, 11, &json!({}))
            .await
            .unwrap();
        service
            .record_delete(AuditEntityType::Kpi, 1, 11, Some("duplicate".into()))
            .await
            .unwrap();

        let kpi_history = service.history(AuditEntityType::Kpi, 1).await.unwrap();
        assert_eq!(kpi_history.len(), 2);
        assert_eq!(kpi_history[1].action, AuditAction::Delete);

        assert_eq!(service.by_user(11).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ids_increase() {
        let store = Arc::new(MemoryAuditStore::new());
        let service = AuditService::new(store.clone());
        for user in 0..3 {
            service
                .record_export(AuditEntityType::Report, 0, user, "json")
                .await
                .unwrap();
        }

        let ids: Vec<Option<Id>> = service.all().await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_handlers_called() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut service = AuditService::in_memory();
        let seen = calls.clone();
        service.on_recorded(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        service
            .record_delete(AuditEntityType::ActionPlan, 5, 1, None)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let service = AuditService::in_memory();
        assert!(matches!(service.get(42).await, Err(AuditError::NotFound(42))));
    }
}
