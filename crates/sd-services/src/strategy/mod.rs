//! Strategy service
//!
//! Single owner of KPIs, OKRs and action plans. Commands are split by entity:
//! `kpis`, `okrs` and `action_plans`.

mod action_plans;
mod kpis;
mod okrs;
pub(crate) mod state;

use chrono::NaiveDate;
use parking_lot::RwLock;
use sd_audit::{AuditEntityType, AuditService};
use sd_core::error::SdError;
use sd_core::result::SdResult;
use sd_core::traits::{Entity, Id, SoftDeletable};
use sd_models::{ActionPlan, Kpi, Okr, StatusLevel};
use sd_progress::{ForecastPoint, ObjectiveProgress, ProgressEngine};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::events::StrategyEvent;
use crate::result::ServiceResult;
use crate::snapshot::StrategySnapshot;
use state::{ProgressChange, StrategyState};

/// User id attributed to scheduled and recomputed changes
pub const SYSTEM_USER_ID: Id = 0;

const EVENT_CAPACITY: usize = 256;

/// Audited shape of a recomputed objective
#[derive(Serialize)]
struct ProgressAudit {
    progress: u8,
    status: StatusLevel,
}

impl From<ObjectiveProgress> for ProgressAudit {
    fn from(p: ObjectiveProgress) -> Self {
        Self {
            progress: p.progress,
            status: p.status,
        }
    }
}

pub struct StrategyService {
    state: RwLock<StrategyState>,
    audit: AuditService,
    engine: ProgressEngine,
    events: broadcast::Sender<StrategyEvent>,
}

impl StrategyService {
    pub fn new(audit: AuditService, engine: ProgressEngine) -> Self {
        Self::from_snapshot(StrategySnapshot::default(), audit, engine)
    }

    /// Start from previously saved state
    ///
    /// Stored progress is not trusted: every objective is recomputed.
    pub fn from_snapshot(snapshot: StrategySnapshot, audit: AuditService, engine: ProgressEngine) -> Self {
        let mut state = StrategyState::from_snapshot(snapshot);
        let refreshed = state.recompute(&engine, |_| true);
        debug!(
            kpis = state.kpis.len(),
            okrs = state.okrs.len(),
            action_plans = state.plans.len(),
            refreshed = refreshed.len(),
            "Strategy state loaded"
        );

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(state),
            audit,
            engine,
            events,
        }
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StrategyEvent> {
        self.events.subscribe()
    }

    pub fn audit(&self) -> &AuditService {
        &self.audit
    }

    pub fn engine(&self) -> &ProgressEngine {
        &self.engine
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Non-deleted KPIs ordered by id
    pub fn kpis(&self) -> Vec<Kpi> {
        self.state.read().active_kpis()
    }

    pub fn okrs(&self) -> Vec<Okr> {
        active_values(self.state.read().okrs.values())
    }

    pub fn action_plans(&self) -> Vec<ActionPlan> {
        active_values(self.state.read().plans.values())
    }

    pub fn kpi(&self, id: Id) -> Option<Kpi> {
        self.state.read().active_kpi(id).ok().cloned()
    }

    pub fn okr(&self, id: Id) -> Option<Okr> {
        self.state.read().active_okr(id).ok().cloned()
    }

    pub fn action_plan(&self, id: Id) -> Option<ActionPlan> {
        let state = self.state.read();
        state.plans.get(&id).filter(|p| !p.is_deleted()).cloned()
    }

    /// Everything, including soft-deleted records
    pub fn snapshot(&self) -> StrategySnapshot {
        self.state.read().to_snapshot()
    }

    /// Progress an objective had on a past date
    pub fn okr_progress_as_of(&self, okr_id: Id, date: NaiveDate) -> SdResult<ObjectiveProgress> {
        let state = self.state.read();
        let okr = state.active_okr(okr_id)?;
        Ok(self.engine.objective(okr, &state.active_kpis(), Some(date)))
    }

    /// Forecast a KPI, over the configured horizon unless one is given
    pub fn forecast(&self, kpi_id: Id, horizon: Option<u32>) -> SdResult<Vec<ForecastPoint>> {
        let state = self.state.read();
        let kpi = state.active_kpi(kpi_id)?;
        Ok(match horizon {
            Some(periods) => self.engine.forecast_for(kpi, periods),
            None => self.engine.forecast(kpi),
        })
    }

    // ------------------------------------------------------------------
    // Shared command plumbing
    // ------------------------------------------------------------------

    fn publish(&self, event: StrategyEvent) {
        debug!(event = event.name(), "Publishing strategy event");
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    /// Audit and announce objectives whose progress moved
    async fn settle_progress(&self, user_id: Id, changes: Vec<ProgressChange>) -> SdResult<()> {
        for change in changes {
            self.audit
                .record_update(
                    AuditEntityType::Okr,
                    change.okr_id,
                    user_id,
                    &ProgressAudit::from(change.before),
                    &ProgressAudit::from(change.after),
                    Some("progress recomputed".to_string()),
                )
                .await?;
            self.announce_progress(&change);
        }
        Ok(())
    }

    fn announce_progress(&self, change: &ProgressChange) {
        debug!(
            okr_id = change.okr_id,
            from = change.before.progress,
            to = change.after.progress,
            status = %change.after.status,
            "Objective progress changed"
        );
        self.publish(StrategyEvent::OkrProgressChanged {
            okr_id: change.okr_id,
            progress: change.after.progress,
            status: change.after.status,
        });
    }
}

fn active_values<'a, T: SoftDeletable + Clone + 'a>(values: impl Iterator<Item = &'a T>) -> Vec<T> {
    values.filter(|v| !v.is_deleted()).cloned().collect()
}

/// Turn a command outcome into a service result, logging failures
pub(crate) fn finish<T>(command: &'static str, outcome: SdResult<T>) -> ServiceResult<T> {
    if let Err(err) = &outcome {
        warn!(command, code = err.error_code(), error = %err, "Command rejected");
    }
    outcome.into()
}

fn not_found<T: Entity>(id: impl ToString) -> SdError {
    SdError::not_found(T::TYPE_NAME, id)
}
