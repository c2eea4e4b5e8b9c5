//! State owned by the strategy service

use sd_core::error::SdError;
use sd_core::result::SdResult;
use sd_core::traits::{Entity, Id, SoftDeletable};
use sd_models::{ActionPlan, Kpi, Okr, StatusLevel};
use sd_progress::{ObjectiveProgress, ProgressEngine};
use std::collections::BTreeMap;

use crate::snapshot::StrategySnapshot;

/// Progress of one objective before and after a recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProgressChange {
    pub okr_id: Id,
    pub before: ObjectiveProgress,
    pub after: ObjectiveProgress,
}

#[derive(Debug, Default)]
pub(crate) struct StrategyState {
    pub kpis: BTreeMap<Id, Kpi>,
    pub okrs: BTreeMap<Id, Okr>,
    pub plans: BTreeMap<Id, ActionPlan>,
    next_kpi_id: Id,
    next_okr_id: Id,
    next_plan_id: Id,
}

fn next_after<'a>(ids: impl Iterator<Item = &'a Id>) -> Id {
    ids.max().map_or(1, |max| max + 1)
}

impl StrategyState {
    /// Load a snapshot; records without an id get fresh ones
    pub fn from_snapshot(snapshot: StrategySnapshot) -> Self {
        let mut state = Self::default();
        let (with_ids, without_ids): (Vec<_>, Vec<_>) =
            snapshot.kpis.into_iter().partition(|k| k.id.is_some());
        for kpi in with_ids {
            if let Some(id) = kpi.id {
                state.kpis.insert(id, kpi);
            }
        }
        state.next_kpi_id = next_after(state.kpis.keys());
        for mut kpi in without_ids {
            let id = state.allocate_kpi_id();
            kpi.id = Some(id);
            state.kpis.insert(id, kpi);
        }

        let (with_ids, without_ids): (Vec<_>, Vec<_>) =
            snapshot.okrs.into_iter().partition(|o| o.id.is_some());
        for okr in with_ids {
            if let Some(id) = okr.id {
                state.okrs.insert(id, okr);
            }
        }
        state.next_okr_id = next_after(state.okrs.keys());
        for mut okr in without_ids {
            let id = state.allocate_okr_id();
            okr.id = Some(id);
            state.okrs.insert(id, okr);
        }

        let (with_ids, without_ids): (Vec<_>, Vec<_>) =
            snapshot.action_plans.into_iter().partition(|p| p.id.is_some());
        for plan in with_ids {
            if let Some(id) = plan.id {
                state.plans.insert(id, plan);
            }
        }
        state.next_plan_id = next_after(state.plans.keys());
        for mut plan in without_ids {
            let id = state.allocate_plan_id();
            plan.id = Some(id);
            state.plans.insert(id, plan);
        }

        state
    }

    pub fn to_snapshot(&self) -> StrategySnapshot {
        StrategySnapshot {
            kpis: self.kpis.values().cloned().collect(),
            okrs: self.okrs.values().cloned().collect(),
            action_plans: self.plans.values().cloned().collect(),
        }
    }

    pub fn allocate_kpi_id(&mut self) -> Id {
        let id = self.next_kpi_id.max(1);
        self.next_kpi_id = id + 1;
        id
    }

    pub fn allocate_okr_id(&mut self) -> Id {
        let id = self.next_okr_id.max(1);
        self.next_okr_id = id + 1;
        id
    }

    pub fn allocate_plan_id(&mut self) -> Id {
        let id = self.next_plan_id.max(1);
        self.next_plan_id = id + 1;
        id
    }

    /// KPIs that take part in progress computation
    pub fn active_kpis(&self) -> Vec<Kpi> {
        self.kpis.values().filter(|k| !k.is_deleted()).cloned().collect()
    }

    pub fn kpi_mut(&mut self, id: Id) -> SdResult<&mut Kpi> {
        self.kpis
            .get_mut(&id)
            .ok_or_else(|| SdError::not_found(Kpi::TYPE_NAME, id))
    }

    pub fn active_kpi(&self, id: Id) -> SdResult<&Kpi> {
        active(self.kpis.get(&id), Kpi::TYPE_NAME, id)
    }

    pub fn active_kpi_mut(&mut self, id: Id) -> SdResult<&mut Kpi> {
        active_mut(self.kpis.get_mut(&id), Kpi::TYPE_NAME, id)
    }

    pub fn okr_mut(&mut self, id: Id) -> SdResult<&mut Okr> {
        self.okrs
            .get_mut(&id)
            .ok_or_else(|| SdError::not_found(Okr::TYPE_NAME, id))
    }

    pub fn active_okr(&self, id: Id) -> SdResult<&Okr> {
        active(self.okrs.get(&id), Okr::TYPE_NAME, id)
    }

    pub fn active_okr_mut(&mut self, id: Id) -> SdResult<&mut Okr> {
        active_mut(self.okrs.get_mut(&id), Okr::TYPE_NAME, id)
    }

    pub fn active_plan_mut(&mut self, id: Id) -> SdResult<&mut ActionPlan> {
        active_mut(self.plans.get_mut(&id), ActionPlan::TYPE_NAME, id)
    }

    /// Recompute progress of every active objective selected by `affected`
    ///
    /// Deleted KPIs stay linked but no longer count.
    pub fn recompute(
        &mut self,
        engine: &ProgressEngine,
        affected: impl Fn(&Okr) -> bool,
    ) -> Vec<ProgressChange> {
        let pool = self.active_kpis();
        let mut changes = Vec::new();

        for (id, okr) in self.okrs.iter_mut() {
            if okr.is_deleted() || !affected(okr) {
                continue;
            }
            let before = ObjectiveProgress {
                progress: okr.progress,
                status: okr.status,
            };
            let after = engine.objective(okr, &pool, None);
            if before != after {
                okr.set_progress(after.progress, after.status);
                changes.push(ProgressChange {
                    okr_id: *id,
                    before,
                    after,
                });
            }
        }

        changes
    }

    /// Fresh progress for a draft objective that is not stored yet
    pub fn evaluate(&self, engine: &ProgressEngine, okr: &Okr) -> (u8, StatusLevel) {
        let result = engine.objective(okr, &self.active_kpis(), None);
        (result.progress, result.status)
    }
}

fn active<'a, T: SoftDeletable>(entity: Option<&'a T>, type_name: &'static str, id: Id) -> SdResult<&'a T> {
    entity
        .filter(|e| !e.is_deleted())
        .ok_or_else(|| SdError::not_found(type_name, id))
}

fn active_mut<'a, T: SoftDeletable>(
    entity: Option<&'a mut T>,
    type_name: &'static str,
    id: Id,
) -> SdResult<&'a mut T> {
    entity
        .filter(|e| !e.is_deleted())
        .ok_or_else(|| SdError::not_found(type_name, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_ids() {
        let snapshot = StrategySnapshot {
            kpis: vec![
                Kpi::new("A", 1.0, 1.0).with_id(4),
                Kpi::new("B", 1.0, 1.0),
            ],
            okrs: vec![Okr::new("O", 2024)],
            action_plans: Vec::new(),
        };
        let mut state = StrategyState::from_snapshot(snapshot);

        assert_eq!(state.kpis.keys().copied().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(state.allocate_kpi_id(), 6);
        assert_eq!(state.okrs.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(state.allocate_plan_id(), 1);
    }

    #[test]
    fn test_recompute_only_affected() {
        let snapshot = StrategySnapshot {
            kpis: vec![Kpi::new("A", 10.0, 50.0).with_id(1).with_current_value(10.0)],
            okrs: vec![
                Okr::new("Linked", 2024).with_id(1).with_kpis([1]),
                Okr::new("Other", 2024).with_id(2),
            ],
            action_plans: Vec::new(),
        };
        let mut state = StrategyState::from_snapshot(snapshot);
        let changes = state.recompute(&ProgressEngine::default(), |okr| okr.links(1));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].okr_id, 1);
        assert_eq!(changes[0].after.progress, 100);
        assert_eq!(state.okrs[&2].progress, 0);
    }

    #[test]
    fn test_deleted_kpi_leaves_pool() {
        let mut kpi = Kpi::new("A", 10.0, 50.0).with_id(1).with_current_value(10.0);
        kpi.mark_deleted(chrono::Utc::now());
        let state = StrategyState::from_snapshot(StrategySnapshot {
            kpis: vec![kpi],
            ..Default::default()
        });

        assert!(state.active_kpis().is_empty());
        assert!(matches!(state.active_kpi(1), Err(SdError::NotFound { .. })));
    }
}
