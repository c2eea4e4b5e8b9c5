//! Action plan model
//!
//! Corrective-action container tied to exactly one KPI or OKR.

use chrono::{DateTime, NaiveDate, Utc};
use sd_core::traits::{Entity, Id, Identifiable, SoftDeletable, Timestamped};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::role::PermissionModule;

/// The KPI or OKR an action plan corrects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entityType", content = "entityId", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityRef {
    Kpi(Id),
    Okr(Id),
}

impl EntityRef {
    pub fn id(&self) -> Id {
        match self {
            Self::Kpi(id) | Self::Okr(id) => *id,
        }
    }

    /// Permission module guarding the referenced entity
    pub fn module(&self) -> PermissionModule {
        match self {
            Self::Kpi(_) => PermissionModule::Kpi,
            Self::Okr(_) => PermissionModule::Okr,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kpi(id) => write!(f, "KPI #{}", id),
            Self::Okr(id) => write!(f, "OKR #{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
    Overdue,
}

impl TaskStatus {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Done)
    }
}

/// One step of an action plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTask {
    pub description: String,
    pub owner_id: Option<Id>,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub status: TaskStatus,
}

impl ActionTask {
    pub fn new(description: impl Into<String>, owner_id: Option<Id>, deadline: NaiveDate) -> Self {
        Self {
            description: description.into(),
            owner_id,
            deadline,
            status: TaskStatus::Pending,
        }
    }

    /// Pending and past its deadline
    pub fn is_late(&self, today: NaiveDate) -> bool {
        self.status == TaskStatus::Pending && self.deadline < today
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionPlanStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
    Cancelled,
}

impl ActionPlanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Allowed lifecycle moves
    pub fn can_transition_to(&self, next: ActionPlanStatus) -> bool {
        use ActionPlanStatus::*;
        matches!(
            (self, next),
            (Draft, InProgress) | (Draft, Cancelled) | (InProgress, Completed) | (InProgress, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Action plan entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[serde(flatten)]
    pub entity: EntityRef,

    #[serde(default)]
    pub tasks: Vec<ActionTask>,

    #[serde(default)]
    pub status: ActionPlanStatus,

    /// Justification recorded when the plan was cancelled
    #[serde(default)]
    pub cancellation_reason: Option<String>,

    pub owner_id: Option<Id>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for ActionPlan {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for ActionPlan {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl SoftDeletable for ActionPlan {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }

    fn restore(&mut self) {
        self.deleted_at = None;
    }
}

impl Entity for ActionPlan {
    const TYPE_NAME: &'static str = "ActionPlan";
}

impl ActionPlan {
    pub fn new(title: impl Into<String>, entity: EntityRef) -> Self {
        Self {
            id: None,
            title: title.into(),
            entity,
            tasks: Vec::new(),
            status: ActionPlanStatus::Draft,
            cancellation_reason: None,
            owner_id: None,
            deleted_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_task(mut self, task: ActionTask) -> Self {
        self.tasks.push(task);
        self
    }

    /// Share of tasks done, as a whole percentage
    pub fn completion(&self) -> u8 {
        if self.tasks.is_empty() {
            return 0;
        }
        let done = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count();
        ((done * 100) / self.tasks.len()) as u8
    }

    pub fn open_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.status.is_open()).count()
    }

    pub fn overdue_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Overdue)
            .count()
    }
}
