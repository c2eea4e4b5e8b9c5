//! KPI model
//!
//! A measured indicator with a goal, a weight inside its parent objectives,
//! and an append-only measurement history.

use chrono::{DateTime, Months, NaiveDate, Utc};
use sd_core::traits::{Entity, Id, Identifiable, SoftDeletable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::status::StatusLevel;

/// How often a KPI is expected to be measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KpiFrequency {
    #[default]
    Monthly,
    Bimonthly,
    Quarterly,
    Semesterly,
}

impl KpiFrequency {
    /// Length of one measurement period in months
    pub fn months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Bimonthly => 2,
            Self::Quarterly => 3,
            Self::Semesterly => 6,
        }
    }

    /// Date the next measurement is due after one taken on `last`
    pub fn next_due(&self, last: NaiveDate) -> NaiveDate {
        last.checked_add_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KpiType {
    #[default]
    Quantitative,
    Qualitative,
}

/// One recorded measurement of a KPI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementEntry {
    /// Reference date the value applies to
    pub date: NaiveDate,
    pub value: f64,
    #[serde(default)]
    pub comment: String,
    /// User who recorded the value
    pub recorded_by: Id,
    pub recorded_at: DateTime<Utc>,
}

impl MeasurementEntry {
    pub fn new(date: NaiveDate, value: f64, recorded_by: Id) -> Self {
        Self {
            date,
            value,
            comment: String::new(),
            recorded_by,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// KPI entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Owning business unit
    pub business_unit_id: Option<Id>,

    pub owner_id: Option<Id>,

    #[serde(default)]
    pub frequency: KpiFrequency,

    #[serde(default, rename = "type")]
    pub kpi_type: KpiType,

    /// Unit of measure, free text
    #[serde(default)]
    pub unit: String,

    pub goal: f64,

    /// Relative importance inside a parent objective (0-100)
    #[validate(range(min = 0.0, max = 100.0))]
    pub weight: f64,

    /// Latest recorded value
    #[serde(default)]
    pub current_value: f64,

    #[serde(default)]
    pub status: StatusLevel,

    #[serde(default)]
    pub history: Vec<MeasurementEntry>,

    pub last_updated: Option<DateTime<Utc>>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Kpi {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: None,
            business_unit_id: None,
            owner_id: None,
            frequency: KpiFrequency::Monthly,
            kpi_type: KpiType::Quantitative,
            unit: String::new(),
            goal: 0.0,
            weight: 0.0,
            current_value: 0.0,
            status: StatusLevel::Red,
            history: Vec::new(),
            last_updated: None,
            deleted_at: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for Kpi {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Kpi {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl SoftDeletable for Kpi {
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

impl Entity for Kpi {
    const TYPE_NAME: &'static str = "KPI";
}

impl Kpi {
    /// Create a new KPI with no measurements yet
    pub fn new(name: impl Into<String>, goal: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            goal,
            weight,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_current_value(mut self, value: f64) -> Self {
        self.current_value = value;
        self
    }

    pub fn with_history(mut self, history: Vec<MeasurementEntry>) -> Self {
        self.history = history;
        self
    }

    /// Append a measurement and make it the current value
    pub fn push_measurement(&mut self, entry: MeasurementEntry, status: StatusLevel) {
        self.current_value = entry.value;
        self.status = status;
        self.last_updated = Some(entry.recorded_at);
        self.updated_at = Some(entry.recorded_at);
        self.history.push(entry);
    }

    /// Reference date of the newest measurement
    pub fn last_measured_on(&self) -> Option<NaiveDate> {
        self.history.iter().map(|e| e.date).max()
    }

    /// Whether a measurement is overdue for the KPI's frequency on `today`
    ///
    /// Entries dated after `today` are ignored.
    pub fn awaiting_measurement(&self, today: NaiveDate) -> bool {
        let last = self.history.iter().map(|e| e.date).filter(|d| *d <= today).max();
        match last {
            Some(last) => self.frequency.next_due(last) < today,
            None => true,
        }
    }
}
