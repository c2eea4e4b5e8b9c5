//! Dashboard reports
//!
//! A [`DashboardReport`] is a read-only summary of the strategy state on a
//! given date. Exporting one requires REPORT/EXPORT and leaves an audit entry.

use chrono::{DateTime, NaiveDate, Utc};
use sd_audit::AuditEntityType;
use sd_contracts::export::ExportContract;
use sd_contracts::{Contract, UserContext};
use sd_core::error::SdError;
use sd_core::result::SdResult;
use sd_core::traits::Id;
use sd_models::{ActionPlan, Kpi, KpiFrequency, Okr, StatusLevel};
use sd_progress::{ProgressEngine, Trend};
use serde::Serialize;
use tracing::info;

use crate::result::ServiceResult;
use crate::strategy::{finish, StrategyService};

/// Number of entities per traffic-light status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub green: usize,
    pub yellow: usize,
    pub red: usize,
}

impl StatusCounts {
    pub fn count(&mut self, status: StatusLevel) {
        match status {
            StatusLevel::Green => self.green += 1,
            StatusLevel::Yellow => self.yellow += 1,
            StatusLevel::Red => self.red += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.green + self.yellow + self.red
    }
}

impl FromIterator<StatusLevel> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = StatusLevel>>(iter: I) -> Self {
        let mut counts = Self::default();
        for status in iter {
            counts.count(status);
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkrRow {
    pub id: Option<Id>,
    pub title: String,
    pub progress: u8,
    pub status: StatusLevel,
    pub kpi_count: usize,
}

/// A RED KPI together with where it is heading
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtRiskKpi {
    pub id: Option<Id>,
    pub name: String,
    pub value: f64,
    pub goal: f64,
    pub unit: String,
    pub progress: f64,
    pub trend: Option<Trend>,
}

/// A KPI whose next measurement is past due
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwaitingKpi {
    pub id: Option<Id>,
    pub name: String,
    pub frequency: KpiFrequency,
    pub last_measured_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlanSummary {
    pub open_plans: usize,
    pub open_tasks: usize,
    pub overdue_tasks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    /// Date the figures refer to; `None` means current values
    pub as_of: Option<NaiveDate>,
    pub kpi_status: StatusCounts,
    pub okr_status: StatusCounts,
    pub okrs: Vec<OkrRow>,
    pub at_risk: Vec<AtRiskKpi>,
    pub awaiting_measurement: Vec<AwaitingKpi>,
    pub action_plans: ActionPlanSummary,
}

impl DashboardReport {
    /// Summarize active entities; pass only non-deleted records
    ///
    /// Without `as_of` the KPI counts use each KPI's stored status, so a KPI
    /// that was never measured stays RED. With `as_of` the status is derived
    /// from the historical value, which is 0 before the first measurement.
    pub fn build(
        kpis: &[Kpi],
        okrs: &[Okr],
        plans: &[ActionPlan],
        engine: &ProgressEngine,
        as_of: Option<NaiveDate>,
    ) -> Self {
        let today = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let mut kpi_status = StatusCounts::default();
        let mut at_risk = Vec::new();
        let mut awaiting_measurement = Vec::new();
        for kpi in kpis {
            let snapshot = engine.kpi(kpi, as_of);
            let status = match as_of {
                Some(_) => snapshot.status,
                None => kpi.status,
            };
            kpi_status.count(status);
            if status.is_at_risk() {
                at_risk.push(AtRiskKpi {
                    id: kpi.id,
                    name: kpi.name.clone(),
                    value: snapshot.value,
                    goal: kpi.goal,
                    unit: kpi.unit.clone(),
                    progress: snapshot.progress,
                    trend: engine.trend(kpi),
                });
            }
            if kpi.awaiting_measurement(today) {
                awaiting_measurement.push(AwaitingKpi {
                    id: kpi.id,
                    name: kpi.name.clone(),
                    frequency: kpi.frequency,
                    last_measured_on: kpi.last_measured_on(),
                });
            }
        }

        let rows: Vec<OkrRow> = okrs
            .iter()
            .map(|okr| {
                let progress = engine.objective(okr, kpis, as_of);
                OkrRow {
                    id: okr.id,
                    title: okr.title.clone(),
                    progress: progress.progress,
                    status: progress.status,
                    kpi_count: okr.kpi_ids.len(),
                }
            })
            .collect();
        let okr_status = rows.iter().map(|row| row.status).collect();

        let open: Vec<&ActionPlan> = plans.iter().filter(|p| !p.status.is_terminal()).collect();
        let action_plans = ActionPlanSummary {
            open_plans: open.len(),
            open_tasks: open.iter().map(|p| p.open_tasks()).sum(),
            overdue_tasks: open.iter().map(|p| p.overdue_tasks()).sum(),
        };

        Self {
            generated_at: Utc::now(),
            as_of,
            kpi_status,
            okr_status,
            okrs: rows,
            at_risk,
            awaiting_measurement,
            action_plans,
        }
    }

    pub fn to_json(&self) -> SdResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SdError::Internal(e.to_string()))
    }
}

impl StrategyService {
    /// Current dashboard, or the dashboard as it stood on `as_of`
    pub fn dashboard(&self, as_of: Option<NaiveDate>) -> DashboardReport {
        DashboardReport::build(
            &self.kpis(),
            &self.okrs(),
            &self.action_plans(),
            self.engine(),
            as_of,
        )
    }

    /// Render the dashboard as JSON for a user allowed to export it
    pub async fn export_report<U: UserContext>(
        &self,
        user: &U,
        as_of: Option<NaiveDate>,
    ) -> ServiceResult<String> {
        finish("export_report", self.try_export_report(user, as_of).await)
    }

    async fn try_export_report<U: UserContext>(&self, user: &U, as_of: Option<NaiveDate>) -> SdResult<String> {
        let report = self.dashboard(as_of);
        ExportContract::new(user).validate(&report)?;

        let rendered = report.to_json()?;
        self.audit()
            .record_export(AuditEntityType::Report, 0, user.id(), "json")
            .await?;
        info!(user_id = user.id(), okrs = report.okrs.len(), "Dashboard report exported");
        Ok(rendered)
    }
}
