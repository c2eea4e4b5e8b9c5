//! Strategy events
//!
//! Published on a broadcast channel after a command has been applied and
//! audited. Dashboards subscribe to refresh without polling.

use chrono::NaiveDate;
use sd_core::traits::Id;
use sd_models::{ActionPlanStatus, StatusLevel};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StrategyEvent {
    KpiCreated { kpi_id: Id },
    KpiUpdated { kpi_id: Id },
    MeasurementRecorded {
        kpi_id: Id,
        date: NaiveDate,
        value: f64,
        status: StatusLevel,
    },
    KpiDeleted { kpi_id: Id },
    KpiRestored { kpi_id: Id },
    OkrCreated { okr_id: Id },
    OkrUpdated { okr_id: Id },
    OkrProgressChanged {
        okr_id: Id,
        progress: u8,
        status: StatusLevel,
    },
    OkrDeleted { okr_id: Id },
    OkrRestored { okr_id: Id },
    ActionPlanCreated { plan_id: Id },
    ActionPlanUpdated { plan_id: Id },
    ActionPlanStatusChanged {
        plan_id: Id,
        status: ActionPlanStatus,
    },
    TaskOverdue { plan_id: Id, task_index: usize },
}

impl StrategyEvent {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Self::KpiCreated { .. } => "kpi_created",
            Self::KpiUpdated { .. } => "kpi_updated",
            Self::MeasurementRecorded { .. } => "measurement_recorded",
            Self::KpiDeleted { .. } => "kpi_deleted",
            Self::KpiRestored { .. } => "kpi_restored",
            Self::OkrCreated { .. } => "okr_created",
            Self::OkrUpdated { .. } => "okr_updated",
            Self::OkrProgressChanged { .. } => "okr_progress_changed",
            Self::OkrDeleted { .. } => "okr_deleted",
            Self::OkrRestored { .. } => "okr_restored",
            Self::ActionPlanCreated { .. } => "action_plan_created",
            Self::ActionPlanUpdated { .. } => "action_plan_updated",
            Self::ActionPlanStatusChanged { .. } => "action_plan_status_changed",
            Self::TaskOverdue { .. } => "task_overdue",
        }
    }
}
