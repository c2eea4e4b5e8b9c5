//! OKR commands

use chrono::Utc;
use sd_audit::AuditEntityType;
use sd_contracts::deletion::DeletionContract;
use sd_contracts::okrs::{CreateOkrContract, LinkKpiContract, UpdateOkrContract};
use sd_contracts::{require_permission, Contract, UserContext};
use sd_core::error::ValidationErrors;
use sd_core::result::SdResult;
use sd_core::traits::{Id, SoftDeletable};
use sd_models::{Kpi, Okr, PermissionAction, PermissionModule};
use tracing::info;

use super::state::ProgressChange;
use super::{finish, not_found, StrategyService};
use crate::events::StrategyEvent;
use crate::params::OkrParams;
use crate::result::ServiceResult;

impl StrategyService {
    /// Create an objective; linked KPIs must exist and be active
    pub async fn create_okr<U: UserContext>(&self, user: &U, draft: Okr) -> ServiceResult<Okr> {
        finish("create_okr", self.try_create_okr(user, draft).await)
    }

    async fn try_create_okr<U: UserContext>(&self, user: &U, mut okr: Okr) -> SdResult<Okr> {
        CreateOkrContract::new(user).validate(&okr)?;

        let (id, okr) = {
            let mut state = self.state.write();

            let mut errors = ValidationErrors::new();
            for kpi_id in &okr.kpi_ids {
                if state.active_kpi(*kpi_id).is_err() {
                    errors.add("kpiIds", format!("references unknown KPI {}", kpi_id));
                }
            }
            errors.into_result()?;

            let now = Utc::now();
            let (progress, status) = state.evaluate(&self.engine, &okr);
            okr.set_progress(progress, status);
            okr.deleted_at = None;
            okr.created_at = Some(now);
            okr.updated_at = Some(now);

            let id = state.allocate_okr_id();
            okr.id = Some(id);
            state.okrs.insert(id, okr.clone());
            (id, okr)
        };

        self.audit
            .record_create(AuditEntityType::Okr, id, user.id(), &okr)
            .await?;
        info!(okr_id = id, title = %okr.title, progress = okr.progress, "OKR created");
        self.publish(StrategyEvent::OkrCreated { okr_id: id });
        Ok(okr)
    }

    /// Edit an objective's definition; links and progress are not touched
    pub async fn update_okr<U: UserContext>(
        &self,
        user: &U,
        okr_id: Id,
        params: OkrParams,
        reason: Option<String>,
    ) -> ServiceResult<Okr> {
        finish("update_okr", self.try_update_okr(user, okr_id, params, reason).await)
    }

    async fn try_update_okr<U: UserContext>(
        &self,
        user: &U,
        okr_id: Id,
        params: OkrParams,
        reason: Option<String>,
    ) -> SdResult<Okr> {
        let (before, after) = {
            let mut state = self.state.write();
            let current = state.active_okr_mut(okr_id)?;
            let before = current.clone();
            let mut after = before.clone();
            params.apply(&mut after);
            UpdateOkrContract::new(user, &before).validate(&after)?;
            after.updated_at = Some(Utc::now());
            *current = after.clone();
            (before, after)
        };

        self.audit
            .record_update(AuditEntityType::Okr, okr_id, user.id(), &before, &after, reason)
            .await?;
        info!(okr_id, user_id = user.id(), "OKR updated");
        self.publish(StrategyEvent::OkrUpdated { okr_id });
        Ok(after)
    }

    /// Link a KPI and recompute the objective; linking twice is a no-op
    pub async fn link_kpi<U: UserContext>(&self, user: &U, okr_id: Id, kpi_id: Id) -> ServiceResult<Okr> {
        finish("link_kpi", self.try_link_kpi(user, okr_id, kpi_id).await)
    }

    async fn try_link_kpi<U: UserContext>(&self, user: &U, okr_id: Id, kpi_id: Id) -> SdResult<Okr> {
        let outcome = {
            let mut state = self.state.write();
            {
                let okr = state.active_okr(okr_id)?;
                let kpi = state.kpis.get(&kpi_id).ok_or_else(|| not_found::<Kpi>(kpi_id))?;
                LinkKpiContract::new(user, okr).validate(kpi)?;
            }

            let okr = state.active_okr_mut(okr_id)?;
            let before = okr.clone();
            if okr.link_kpi(kpi_id) {
                okr.updated_at = Some(Utc::now());
                let changes = state.recompute(&self.engine, |o| o.id == Some(okr_id));
                let after = state.active_okr(okr_id)?.clone();
                Ok((before, after, changes))
            } else {
                Err(before)
            }
        };

        match outcome {
            Ok((before, after, changes)) => {
                self.record_relink(user, okr_id, &before, &after, changes).await?;
                info!(okr_id, kpi_id, progress = after.progress, "KPI linked");
                Ok(after)
            }
            Err(unchanged) => Ok(unchanged),
        }
    }

    /// Unlink a KPI and recompute the objective; unlinking twice is a no-op
    ///
    /// The KPI itself may already be deleted or gone.
    pub async fn unlink_kpi<U: UserContext>(&self, user: &U, okr_id: Id, kpi_id: Id) -> ServiceResult<Okr> {
        finish("unlink_kpi", self.try_unlink_kpi(user, okr_id, kpi_id).await)
    }

    async fn try_unlink_kpi<U: UserContext>(&self, user: &U, okr_id: Id, kpi_id: Id) -> SdResult<Okr> {
        let mut errors = ValidationErrors::new();
        require_permission(user, PermissionModule::Okr, PermissionAction::Edit, &mut errors);
        errors.into_result()?;

        let outcome = {
            let mut state = self.state.write();
            let okr = state.active_okr_mut(okr_id)?;
            let before = okr.clone();
            if okr.unlink_kpi(kpi_id) {
                okr.updated_at = Some(Utc::now());
                let changes = state.recompute(&self.engine, |o| o.id == Some(okr_id));
                let after = state.active_okr(okr_id)?.clone();
                Ok((before, after, changes))
            } else {
                Err(before)
            }
        };

        match outcome {
            Ok((before, after, changes)) => {
                self.record_relink(user, okr_id, &before, &after, changes).await?;
                info!(okr_id, kpi_id, progress = after.progress, "KPI unlinked");
                Ok(after)
            }
            Err(unchanged) => Ok(unchanged),
        }
    }

    /// Audit a link change in one diff, which already covers the new progress
    async fn record_relink<U: UserContext>(
        &self,
        user: &U,
        okr_id: Id,
        before: &Okr,
        after: &Okr,
        changes: Vec<ProgressChange>,
    ) -> SdResult<()> {
        self.audit
            .record_update(AuditEntityType::Okr, okr_id, user.id(), before, after, None)
            .await?;
        self.publish(StrategyEvent::OkrUpdated { okr_id });
        for change in &changes {
            self.announce_progress(change);
        }
        Ok(())
    }

    pub async fn delete_okr<U: UserContext>(
        &self,
        user: &U,
        okr_id: Id,
        reason: Option<String>,
    ) -> ServiceResult<Okr> {
        finish("delete_okr", self.try_delete_okr(user, okr_id, reason).await)
    }

    async fn try_delete_okr<U: UserContext>(&self, user: &U, okr_id: Id, reason: Option<String>) -> SdResult<Okr> {
        let okr = {
            let mut state = self.state.write();
            let okr = state.okr_mut(okr_id)?;
            DeletionContract::delete(user, PermissionModule::Okr).validate(&*okr)?;
            okr.mark_deleted(Utc::now());
            okr.clone()
        };

        self.audit
            .record_delete(AuditEntityType::Okr, okr_id, user.id(), reason)
            .await?;
        info!(okr_id, user_id = user.id(), "OKR deleted");
        self.publish(StrategyEvent::OkrDeleted { okr_id });
        Ok(okr)
    }

    /// Restore an objective, refreshing progress missed while it was deleted
    pub async fn restore_okr<U: UserContext>(
        &self,
        user: &U,
        okr_id: Id,
        reason: Option<String>,
    ) -> ServiceResult<Okr> {
        finish("restore_okr", self.try_restore_okr(user, okr_id, reason).await)
    }

    async fn try_restore_okr<U: UserContext>(&self, user: &U, okr_id: Id, reason: Option<String>) -> SdResult<Okr> {
        let (before, after, changes) = {
            let mut state = self.state.write();
            let okr = state.okr_mut(okr_id)?;
            DeletionContract::restore(user, PermissionModule::Okr).validate(&*okr)?;
            let before = okr.clone();
            okr.restore();
            let changes = state.recompute(&self.engine, |o| o.id == Some(okr_id));
            let after = state.active_okr(okr_id)?.clone();
            (before, after, changes)
        };

        self.audit
            .record_update(AuditEntityType::Okr, okr_id, user.id(), &before, &after, reason)
            .await?;
        info!(okr_id, user_id = user.id(), "OKR restored");
        self.publish(StrategyEvent::OkrRestored { okr_id });
        for change in &changes {
            self.announce_progress(change);
        }
        Ok(after)
    }
}
