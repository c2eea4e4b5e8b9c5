//! # sd-models
//!
//! Domain models for Stratdash.
//!
//! Each model implements the core traits from `sd-core` (Entity, Identifiable, etc.)

pub use sd_core::traits::{Entity, Id, Identifiable, SoftDeletable, Timestamped};

pub mod action_plan;
pub mod group;
pub mod kpi;
pub mod okr;
pub mod role;
pub mod status;
pub mod user;

pub use action_plan::{ActionPlan, ActionPlanStatus, ActionTask, EntityRef, TaskStatus};
pub use group::{BusinessUnit, Group};
pub use kpi::{Kpi, KpiFrequency, KpiType, MeasurementEntry};
pub use okr::{Okr, OkrScope};
pub use role::{PermissionAction, PermissionMap, PermissionMatrix, PermissionModule, RoleDefinition};
pub use status::StatusLevel;
pub use user::User;
