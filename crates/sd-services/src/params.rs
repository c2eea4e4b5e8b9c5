//! Partial updates for KPIs and OKRs
//!
//! Only fields set to `Some` are applied.

use sd_core::traits::Id;
use sd_models::{Kpi, KpiFrequency, KpiType, Okr, OkrScope};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub business_unit_id: Option<Id>,
    pub owner_id: Option<Id>,
    pub frequency: Option<KpiFrequency>,
    #[serde(rename = "type")]
    pub kpi_type: Option<KpiType>,
    pub unit: Option<String>,
    pub goal: Option<f64>,
    pub weight: Option<f64>,
}

impl KpiParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_goal(mut self, goal: f64) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Whether applying these params can change linked objectives' progress
    pub fn affects_progress(&self) -> bool {
        self.goal.is_some() || self.weight.is_some()
    }

    pub fn apply(&self, kpi: &mut Kpi) {
        if let Some(name) = &self.name {
            kpi.name = name.clone();
        }
        if let Some(description) = &self.description {
            kpi.description = Some(description.clone());
        }
        if let Some(bu) = self.business_unit_id {
            kpi.business_unit_id = Some(bu);
        }
        if let Some(owner) = self.owner_id {
            kpi.owner_id = Some(owner);
        }
        if let Some(frequency) = self.frequency {
            kpi.frequency = frequency;
        }
        if let Some(kpi_type) = self.kpi_type {
            kpi.kpi_type = kpi_type;
        }
        if let Some(unit) = &self.unit {
            kpi.unit = unit.clone();
        }
        if let Some(goal) = self.goal {
            kpi.goal = goal;
        }
        if let Some(weight) = self.weight {
            kpi.weight = weight;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkrParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub business_unit_id: Option<Id>,
    pub scope: Option<OkrScope>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub weight: Option<f64>,
    pub owner_id: Option<Id>,
}

impl OkrParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_years(mut self, start_year: i32, end_year: i32) -> Self {
        self.start_year = Some(start_year);
        self.end_year = Some(end_year);
        self
    }

    pub fn with_scope(mut self, scope: OkrScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn apply(&self, okr: &mut Okr) {
        if let Some(title) = &self.title {
            okr.title = title.clone();
        }
        if let Some(description) = &self.description {
            okr.description = Some(description.clone());
        }
        if let Some(bu) = self.business_unit_id {
            okr.business_unit_id = Some(bu);
        }
        if let Some(scope) = self.scope {
            okr.scope = scope;
        }
        if let Some(start) = self.start_year {
            okr.start_year = start;
        }
        if let Some(end) = self.end_year {
            okr.end_year = end;
        }
        if let Some(weight) = self.weight {
            okr.weight = weight;
        }
        if let Some(owner) = self.owner_id {
            okr.owner_id = Some(owner);
        }
    }
}
