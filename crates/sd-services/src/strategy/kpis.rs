//! KPI commands

use chrono::{NaiveDate, Utc};
use sd_audit::AuditEntityType;
use sd_contracts::deletion::DeletionContract;
use sd_contracts::kpis::{CreateKpiContract, MeasurementContract, UpdateKpiContract};
use sd_contracts::{Contract, UserContext};
use sd_core::result::SdResult;
use sd_core::traits::{Id, SoftDeletable};
use sd_models::{Kpi, MeasurementEntry, PermissionModule, StatusLevel};
use sd_progress::status_for;
use serde::Serialize;
use tracing::info;

use super::{finish, StrategyService};
use crate::events::StrategyEvent;
use crate::params::KpiParams;
use crate::result::ServiceResult;

/// Audited shape of a KPI around a measurement
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MeasurementAudit<'a> {
    current_value: f64,
    status: StatusLevel,
    last_measurement: Option<&'a MeasurementEntry>,
}

impl<'a> MeasurementAudit<'a> {
    fn of(kpi: &'a Kpi) -> Self {
        Self {
            current_value: kpi.current_value,
            status: kpi.status,
            last_measurement: kpi.history.last(),
        }
    }
}

impl StrategyService {
    /// Create a KPI; it starts at value 0 with RED status and no history
    pub async fn create_kpi<U: UserContext>(&self, user: &U, draft: Kpi) -> ServiceResult<Kpi> {
        finish("create_kpi", self.try_create_kpi(user, draft).await)
    }

    async fn try_create_kpi<U: UserContext>(&self, user: &U, mut kpi: Kpi) -> SdResult<Kpi> {
        CreateKpiContract::new(user).validate(&kpi)?;

        let now = Utc::now();
        kpi.current_value = 0.0;
        kpi.status = StatusLevel::Red;
        kpi.last_updated = None;
        kpi.deleted_at = None;
        kpi.created_at = Some(now);
        kpi.updated_at = Some(now);

        let (id, kpi) = {
            let mut state = self.state.write();
            let id = state.allocate_kpi_id();
            kpi.id = Some(id);
            state.kpis.insert(id, kpi.clone());
            (id, kpi)
        };

        self.audit
            .record_create(AuditEntityType::Kpi, id, user.id(), &kpi)
            .await?;
        info!(kpi_id = id, name = %kpi.name, user_id = user.id(), "KPI created");
        self.publish(StrategyEvent::KpiCreated { kpi_id: id });
        Ok(kpi)
    }

    /// Edit a KPI's definition
    ///
    /// A goal change re-derives the status of a measured KPI; goal or
    /// weight changes refresh every objective linking it.
    pub async fn update_kpi<U: UserContext>(
        &self,
        user: &U,
        kpi_id: Id,
        params: KpiParams,
        reason: Option<String>,
    ) -> ServiceResult<Kpi> {
        finish("update_kpi", self.try_update_kpi(user, kpi_id, params, reason).await)
    }

    async fn try_update_kpi<U: UserContext>(
        &self,
        user: &U,
        kpi_id: Id,
        params: KpiParams,
        reason: Option<String>,
    ) -> SdResult<Kpi> {
        let (before, after, changes) = {
            let mut state = self.state.write();
            let current = state.active_kpi_mut(kpi_id)?;
            let before = current.clone();
            let mut after = before.clone();
            params.apply(&mut after);
            UpdateKpiContract::new(user, &before).validate(&after)?;

            if params.goal.is_some() && !after.history.is_empty() {
                after.status = status_for(after.current_value, after.goal);
            }
            after.updated_at = Some(Utc::now());
            *current = after.clone();

            let changes = if params.affects_progress() {
                state.recompute(&self.engine, |okr| okr.links(kpi_id))
            } else {
                Vec::new()
            };
            (before, after, changes)
        };

        let entries = self
            .audit
            .record_update(AuditEntityType::Kpi, kpi_id, user.id(), &before, &after, reason)
            .await?;
        info!(kpi_id, fields = entries.len(), user_id = user.id(), "KPI updated");
        self.publish(StrategyEvent::KpiUpdated { kpi_id });
        self.settle_progress(user.id(), changes).await?;
        Ok(after)
    }

    /// Append a measurement, making it the KPI's current value
    ///
    /// The new value becomes current even when `date` is older than existing
    /// entries; point-in-time queries still read history by date.
    pub async fn record_measurement<U: UserContext>(
        &self,
        user: &U,
        kpi_id: Id,
        date: NaiveDate,
        value: f64,
        comment: impl Into<String>,
    ) -> ServiceResult<Kpi> {
        let entry = MeasurementEntry::new(date, value, user.id()).with_comment(comment);
        finish("record_measurement", self.try_record_measurement(user, kpi_id, entry).await)
    }

    async fn try_record_measurement<U: UserContext>(
        &self,
        user: &U,
        kpi_id: Id,
        entry: MeasurementEntry,
    ) -> SdResult<Kpi> {
        MeasurementContract::new(user).validate(&entry)?;
        let (date, value) = (entry.date, entry.value);

        let (before, after, changes) = {
            let mut state = self.state.write();
            let kpi = state.active_kpi_mut(kpi_id)?;
            let before = kpi.clone();
            let status = status_for(value, kpi.goal);
            kpi.push_measurement(entry, status);
            let after = kpi.clone();
            let changes = state.recompute(&self.engine, |okr| okr.links(kpi_id));
            (before, after, changes)
        };

        self.audit
            .record_update(
                AuditEntityType::Kpi,
                kpi_id,
                user.id(),
                &MeasurementAudit::of(&before),
                &MeasurementAudit::of(&after),
                Some(format!("measurement for {}", date)),
            )
            .await?;
        info!(kpi_id, %date, value, status = %after.status, "Measurement recorded");
        self.publish(StrategyEvent::MeasurementRecorded {
            kpi_id,
            date,
            value,
            status: after.status,
        });
        self.settle_progress(user.id(), changes).await?;
        Ok(after)
    }

    /// Soft-delete a KPI; objectives keep the link but stop counting it
    pub async fn delete_kpi<U: UserContext>(
        &self,
        user: &U,
        kpi_id: Id,
        reason: Option<String>,
    ) -> ServiceResult<Kpi> {
        finish("delete_kpi", self.try_delete_kpi(user, kpi_id, reason).await)
    }

    async fn try_delete_kpi<U: UserContext>(&self, user: &U, kpi_id: Id, reason: Option<String>) -> SdResult<Kpi> {
        let (kpi, changes) = {
            let mut state = self.state.write();
            let kpi = state.kpi_mut(kpi_id)?;
            DeletionContract::delete(user, PermissionModule::Kpi).validate(&*kpi)?;
            kpi.mark_deleted(Utc::now());
            let kpi = kpi.clone();
            let changes = state.recompute(&self.engine, |okr| okr.links(kpi_id));
            (kpi, changes)
        };

        self.audit
            .record_delete(AuditEntityType::Kpi, kpi_id, user.id(), reason)
            .await?;
        info!(kpi_id, user_id = user.id(), "KPI deleted");
        self.publish(StrategyEvent::KpiDeleted { kpi_id });
        self.settle_progress(user.id(), changes).await?;
        Ok(kpi)
    }

    pub async fn restore_kpi<U: UserContext>(
        &self,
        user: &U,
        kpi_id: Id,
        reason: Option<String>,
    ) -> ServiceResult<Kpi> {
        finish("restore_kpi", self.try_restore_kpi(user, kpi_id, reason).await)
    }

    async fn try_restore_kpi<U: UserContext>(&self, user: &U, kpi_id: Id, reason: Option<String>) -> SdResult<Kpi> {
        let (before, after, changes) = {
            let mut state = self.state.write();
            let kpi = state.kpi_mut(kpi_id)?;
            DeletionContract::restore(user, PermissionModule::Kpi).validate(&*kpi)?;
            let before = kpi.clone();
            kpi.restore();
            let after = kpi.clone();
            let changes = state.recompute(&self.engine, |okr| okr.links(kpi_id));
            (before, after, changes)
        };

        self.audit
            .record_update(AuditEntityType::Kpi, kpi_id, user.id(), &before, &after, reason)
            .await?;
        info!(kpi_id, user_id = user.id(), "KPI restored");
        self.publish(StrategyEvent::KpiRestored { kpi_id });
        self.settle_progress(user.id(), changes).await?;
        Ok(after)
    }
}
