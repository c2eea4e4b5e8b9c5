//! Action plan commands

use chrono::{NaiveDate, Utc};
use sd_audit::AuditEntityType;
use sd_contracts::action_plans::{
    CreateActionPlanContract, PlanStatusChange, PlanStatusContract, TaskContract,
};
use sd_contracts::{Contract, UserContext};
use sd_core::error::{SdError, ValidationErrors};
use sd_core::result::SdResult;
use sd_core::traits::{Id, SoftDeletable};
use sd_models::{ActionPlan, ActionPlanStatus, ActionTask, EntityRef, TaskStatus};
use tracing::info;

use super::{finish, StrategyService, SYSTEM_USER_ID};
use crate::events::StrategyEvent;
use crate::result::ServiceResult;

impl StrategyService {
    /// Open an action plan against an existing KPI or OKR
    pub async fn create_action_plan<U: UserContext>(
        &self,
        user: &U,
        draft: ActionPlan,
    ) -> ServiceResult<ActionPlan> {
        finish("create_action_plan", self.try_create_action_plan(user, draft).await)
    }

    async fn try_create_action_plan<U: UserContext>(&self, user: &U, mut plan: ActionPlan) -> SdResult<ActionPlan> {
        CreateActionPlanContract::new(user).validate(&plan)?;

        let (id, plan) = {
            let mut state = self.state.write();
            let exists = match plan.entity {
                EntityRef::Kpi(id) => state.active_kpi(id).is_ok(),
                EntityRef::Okr(id) => state.active_okr(id).is_ok(),
            };
            if !exists {
                let mut errors = ValidationErrors::new();
                errors.add("entityId", format!("references unknown {}", plan.entity));
                return Err(errors.into());
            }

            let now = Utc::now();
            plan.cancellation_reason = None;
            plan.deleted_at = None;
            plan.created_at = Some(now);
            plan.updated_at = Some(now);

            let id = state.allocate_plan_id();
            plan.id = Some(id);
            state.plans.insert(id, plan.clone());
            (id, plan)
        };

        self.audit
            .record_create(AuditEntityType::ActionPlan, id, user.id(), &plan)
            .await?;
        info!(plan_id = id, entity = %plan.entity, tasks = plan.tasks.len(), "Action plan created");
        self.publish(StrategyEvent::ActionPlanCreated { plan_id: id });
        Ok(plan)
    }

    pub async fn add_task<U: UserContext>(
        &self,
        user: &U,
        plan_id: Id,
        task: ActionTask,
    ) -> ServiceResult<ActionPlan> {
        finish("add_task", self.try_add_task(user, plan_id, task).await)
    }

    async fn try_add_task<U: UserContext>(&self, user: &U, plan_id: Id, task: ActionTask) -> SdResult<ActionPlan> {
        let (before, after) = {
            let mut state = self.state.write();
            let plan = state.active_plan_mut(plan_id)?;
            TaskContract::new(user, plan).validate(&task)?;
            let before = plan.clone();
            plan.tasks.push(task);
            plan.updated_at = Some(Utc::now());
            (before, plan.clone())
        };

        self.audit
            .record_update(AuditEntityType::ActionPlan, plan_id, user.id(), &before, &after, None)
            .await?;
        self.publish(StrategyEvent::ActionPlanUpdated { plan_id });
        Ok(after)
    }

    /// Change the status of the task at `index` in the plan's task list
    pub async fn set_task_status<U: UserContext>(
        &self,
        user: &U,
        plan_id: Id,
        index: usize,
        status: TaskStatus,
    ) -> ServiceResult<ActionPlan> {
        finish(
            "set_task_status",
            self.try_set_task_status(user, plan_id, index, status).await,
        )
    }

    async fn try_set_task_status<U: UserContext>(
        &self,
        user: &U,
        plan_id: Id,
        index: usize,
        status: TaskStatus,
    ) -> SdResult<ActionPlan> {
        let (before, after) = {
            let mut state = self.state.write();
            let plan = state.active_plan_mut(plan_id)?;
            let mut task = plan
                .tasks
                .get(index)
                .cloned()
                .ok_or_else(|| SdError::not_found("ActionTask", format!("{}/{}", plan_id, index)))?;
            task.status = status;
            TaskContract::new(user, plan).validate(&task)?;

            let before = plan.clone();
            plan.tasks[index] = task;
            plan.updated_at = Some(Utc::now());
            (before, plan.clone())
        };

        self.audit
            .record_update(AuditEntityType::ActionPlan, plan_id, user.id(), &before, &after, None)
            .await?;
        info!(plan_id, index, completion = after.completion(), "Task status changed");
        self.publish(StrategyEvent::ActionPlanUpdated { plan_id });
        Ok(after)
    }

    /// Move a plan through its lifecycle
    ///
    /// Cancelling stores the justification on the plan and in the audit entry.
    pub async fn set_plan_status<U: UserContext>(
        &self,
        user: &U,
        plan_id: Id,
        change: PlanStatusChange,
    ) -> ServiceResult<ActionPlan> {
        finish("set_plan_status", self.try_set_plan_status(user, plan_id, change).await)
    }

    async fn try_set_plan_status<U: UserContext>(
        &self,
        user: &U,
        plan_id: Id,
        change: PlanStatusChange,
    ) -> SdResult<ActionPlan> {
        let (before, after) = {
            let mut state = self.state.write();
            let plan = state.active_plan_mut(plan_id)?;
            PlanStatusContract::new(user, plan).validate(&change)?;

            let before = plan.clone();
            plan.status = change.to;
            if change.to == ActionPlanStatus::Cancelled {
                plan.cancellation_reason = change.justification.clone();
            }
            plan.updated_at = Some(Utc::now());
            (before, plan.clone())
        };

        self.audit
            .record_update(
                AuditEntityType::ActionPlan,
                plan_id,
                user.id(),
                &before,
                &after,
                change.justification,
            )
            .await?;
        info!(plan_id, from = before.status.as_str(), to = after.status.as_str(), "Action plan status changed");
        self.publish(StrategyEvent::ActionPlanStatusChanged {
            plan_id,
            status: after.status,
        });
        Ok(after)
    }

    /// Flag pending tasks of open plans whose deadline is before `today`
    ///
    /// Runs as the system user and returns the number of tasks flagged.
    pub async fn mark_overdue_tasks(&self, today: NaiveDate) -> ServiceResult<usize> {
        finish("mark_overdue_tasks", self.try_mark_overdue_tasks(today).await)
    }

    async fn try_mark_overdue_tasks(&self, today: NaiveDate) -> SdResult<usize> {
        let flagged: Vec<(ActionPlan, ActionPlan, Vec<usize>)> = {
            let mut state = self.state.write();
            let now = Utc::now();
            let mut flagged = Vec::new();

            for plan in state.plans.values_mut() {
                if plan.is_deleted() || plan.status.is_terminal() {
                    continue;
                }
                let late: Vec<usize> = plan
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, task)| task.is_late(today))
                    .map(|(index, _)| index)
                    .collect();
                if late.is_empty() {
                    continue;
                }

                let before = plan.clone();
                for &index in &late {
                    plan.tasks[index].status = TaskStatus::Overdue;
                }
                plan.updated_at = Some(now);
                flagged.push((before, plan.clone(), late));
            }
            flagged
        };

        let mut count = 0;
        for (before, after, late) in flagged {
            let plan_id = after.id.unwrap_or_default();
            self.audit
                .record_update(
                    AuditEntityType::ActionPlan,
                    plan_id,
                    SYSTEM_USER_ID,
                    &before,
                    &after,
                    Some(format!("deadline passed before {}", today)),
                )
                .await?;
            for task_index in late {
                self.publish(StrategyEvent::TaskOverdue { plan_id, task_index });
                count += 1;
            }
        }

        if count > 0 {
            info!(count, %today, "Tasks marked overdue");
        }
        Ok(count)
    }
}
