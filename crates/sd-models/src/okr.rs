//! OKR (objective) model

use chrono::{DateTime, Utc};
use sd_core::traits::{Entity, Id, Identifiable, SoftDeletable, Timestamped};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::Validate;

use crate::status::StatusLevel;

/// Temporal scope of an objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OkrScope {
    #[default]
    Annual,
    MultiYear,
}

/// Objective entity
///
/// Progress and status are derived from the linked KPIs and recomputed
/// whenever a link or a linked KPI's value changes.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Okr {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    pub business_unit_id: Option<Id>,

    #[serde(default)]
    pub scope: OkrScope,

    pub start_year: i32,
    pub end_year: i32,

    /// Strategic weight
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub weight: f64,

    pub owner_id: Option<Id>,

    /// Linked KPIs
    #[serde(default)]
    pub kpi_ids: BTreeSet<Id>,

    /// Completion percentage (0-100)
    #[serde(default)]
    pub progress: u8,

    #[serde(default)]
    pub status: StatusLevel,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Okr {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Okr {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl SoftDeletable for Okr {
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

impl Entity for Okr {
    const TYPE_NAME: &'static str = "OKR";
}

impl Okr {
    /// Create a single-year objective with nothing linked
    pub fn new(title: impl Into<String>, year: i32) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            business_unit_id: None,
            scope: OkrScope::Annual,
            start_year: year,
            end_year: year,
            weight: 0.0,
            owner_id: None,
            kpi_ids: BTreeSet::new(),
            progress: 0,
            status: StatusLevel::Red,
            deleted_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Create an objective spanning several years
    pub fn multi_year(title: impl Into<String>, start_year: i32, end_year: i32) -> Self {
        Self {
            scope: OkrScope::MultiYear,
            start_year,
            end_year,
            ..Self::new(title, start_year)
        }
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_kpis(mut self, kpi_ids: impl IntoIterator<Item = Id>) -> Self {
        self.kpi_ids.extend(kpi_ids);
        self
    }

    /// Link a KPI, returning false when it was already linked
    pub fn link_kpi(&mut self, kpi_id: Id) -> bool {
        self.kpi_ids.insert(kpi_id)
    }

    /// Unlink a KPI, returning false when it was not linked
    pub fn unlink_kpi(&mut self, kpi_id: Id) -> bool {
        self.kpi_ids.remove(&kpi_id)
    }

    pub fn links(&self, kpi_id: Id) -> bool {
        self.kpi_ids.contains(&kpi_id)
    }

    /// Whether the objective covers a calendar year
    pub fn covers_year(&self, year: i32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }

    pub fn set_progress(&mut self, progress: u8, status: StatusLevel) {
        self.progress = progress.min(100);
        self.status = status;
    }
}
