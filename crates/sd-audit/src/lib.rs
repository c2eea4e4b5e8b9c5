//! # sd-audit
//!
//! Audit logging for Stratdash.
//!
//! Every change to a KPI, OKR or action plan, and every report export, leaves
//! an immutable entry recording who did what, when, and the old and new
//! values. Entries are only ever appended.

pub mod diff;
pub mod entry;
pub mod service;

pub use diff::{field_changes, FieldChange};
pub use entry::{AuditAction, AuditEntityType, AuditEntry};
pub use service::{AuditError, AuditResult, AuditService, AuditStore, MemoryAuditStore};
