use chrono::NaiveDate;
use sd_audit::{AuditAction, AuditEntityType, AuditService};
use sd_auth::CurrentUser;
use sd_contracts::action_plans::PlanStatusChange;
use sd_models::{
    ActionPlan, ActionPlanStatus, ActionTask, EntityRef, Kpi, Okr, PermissionAction, PermissionMatrix,
    PermissionModule, StatusLevel, TaskStatus,
};
use sd_progress::ProgressEngine;
use sd_services::{KpiParams, OkrParams, ServiceResult, StrategyEvent, StrategyService};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ok<T>(result: ServiceResult<T>) -> T {
    result.into_result().unwrap()
}

fn service() -> StrategyService {
    StrategyService::new(AuditService::in_memory(), ProgressEngine::default())
}

fn admin() -> CurrentUser {
    CurrentUser::admin(1, "Ana")
}

/// Revenue at 95% and NPS above goal, linked by one objective
async fn revenue_and_nps(service: &StrategyService, user: &CurrentUser) -> (Kpi, Kpi, Okr) {
    let revenue = ok(service
        .create_kpi(user, Kpi::new("Revenue", 1_000_000.0, 40.0).with_unit("EUR"))
        .await);
    let nps = ok(service.create_kpi(user, Kpi::new("NPS", 60.0, 60.0)).await);
    let revenue_id = revenue.id.unwrap();
    let nps_id = nps.id.unwrap();

    let revenue = ok(service
        .record_measurement(user, revenue_id, date(2024, 3, 31), 950_000.0, "Q1 close")
        .await);
    let nps = ok(service
        .record_measurement(user, nps_id, date(2024, 3, 31), 65.0, "")
        .await);

    let okr = ok(service
        .create_okr(user, Okr::new("Grow profitably", 2024).with_kpis([revenue_id, nps_id]))
        .await);
    (revenue, nps, okr)
}

#[tokio::test]
async fn test_revenue_reaching_goal_turns_objective_green() {
    let service = service();
    let user = admin();
    let (revenue, nps, okr) = revenue_and_nps(&service, &user).await;

    assert_eq!(revenue.status, StatusLevel::Yellow);
    assert_eq!(nps.status, StatusLevel::Green);
    assert_eq!(okr.progress, 98);
    assert_eq!(okr.status, StatusLevel::Yellow);

    ok(service
        .record_measurement(&user, revenue.id.unwrap(), date(2024, 4, 30), 1_000_000.0, "April")
        .await);

    let okr = service.okr(okr.id.unwrap()).unwrap();
    assert_eq!(okr.progress, 100);
    assert_eq!(okr.status, StatusLevel::Green);

    let earlier = service
        .okr_progress_as_of(okr.id.unwrap(), date(2024, 4, 1))
        .unwrap();
    assert_eq!(earlier.progress, 98);
}

#[tokio::test]
async fn test_events_follow_commands() {
    let service = service();
    let user = admin();
    let mut events = service.subscribe();

    let kpi = ok(service.create_kpi(&user, Kpi::new("Churn", 5.0, 100.0)).await);
    let kpi_id = kpi.id.unwrap();
    let okr = ok(service.create_okr(&user, Okr::new("Retain", 2024)).await);
    let okr_id = okr.id.unwrap();
    ok(service.link_kpi(&user, okr_id, kpi_id).await);
    ok(service
        .record_measurement(&user, kpi_id, date(2024, 1, 31), 5.0, "")
        .await);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }

    assert_eq!(seen[0], StrategyEvent::KpiCreated { kpi_id });
    assert_eq!(seen[1], StrategyEvent::OkrCreated { okr_id });
    assert_eq!(seen[2], StrategyEvent::OkrUpdated { okr_id });
    assert!(seen.contains(&StrategyEvent::OkrProgressChanged {
        okr_id,
        progress: 100,
        status: StatusLevel::Green,
    }));
    assert_eq!(seen.last().map(|e| e.name()), Some("okr_progress_changed"));
}

#[tokio::test]
async fn test_link_twice_is_noop() {
    let service = service();
    let user = admin();
    let (revenue, _, okr) = revenue_and_nps(&service, &user).await;
    let okr_id = okr.id.unwrap();
    let before = service.audit().all().await.unwrap().len();

    let again = ok(service.link_kpi(&user, okr_id, revenue.id.unwrap()).await);
    assert_eq!(again.kpi_ids.len(), 2);
    assert_eq!(service.audit().all().await.unwrap().len(), before);

    let unlinked = ok(service.unlink_kpi(&user, okr_id, revenue.id.unwrap()).await);
    assert_eq!(unlinked.progress, 100);
    let unlinked = ok(service.unlink_kpi(&user, okr_id, revenue.id.unwrap()).await);
    assert_eq!(unlinked.kpi_ids.len(), 1);
}

#[tokio::test]
async fn test_link_unknown_kpi() {
    let service = service();
    let user = admin();
    let okr = ok(service.create_okr(&user, Okr::new("Lonely", 2024)).await);

    let result = service.link_kpi(&user, okr.id.unwrap(), 77).await;
    assert!(result.is_failure());
    assert!(result.errors().has_base_errors());

    let result = service
        .create_okr(&user, Okr::new("Dangling", 2024).with_kpis([77]))
        .await;
    assert!(result.errors().has_error("kpiIds"));
}

#[tokio::test]
async fn test_permissions_are_enforced() {
    let service = service();
    let viewer = CurrentUser::with_permissions(
        2,
        "Vic",
        PermissionMatrix::new()
            .with(PermissionModule::Kpi, &[PermissionAction::View])
            .with(PermissionModule::Report, &[PermissionAction::View]),
    );

    let result = service.create_kpi(&viewer, Kpi::new("Revenue", 10.0, 10.0)).await;
    assert!(result.is_failure());
    assert!(result.full_messages()[0].contains("not authorized"));
    assert!(service.kpis().is_empty());

    let result = service.export_report(&viewer, None).await;
    assert!(result.is_failure());
    assert!(service.audit().all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_goal_rederives_status() {
    let service = service();
    let user = admin();
    let (revenue, _, okr) = revenue_and_nps(&service, &user).await;

    let updated = ok(service
        .update_kpi(
            &user,
            revenue.id.unwrap(),
            KpiParams::default().with_goal(950_000.0),
            Some("target revised".into()),
        )
        .await);
    assert_eq!(updated.status, StatusLevel::Green);
    assert_eq!(service.okr(okr.id.unwrap()).unwrap().status, StatusLevel::Green);

    let history = service
        .audit()
        .history(AuditEntityType::Kpi, revenue.id.unwrap())
        .await
        .unwrap();
    let goal_change = history
        .iter()
        .find(|e| e.field.as_deref() == Some("goal"))
        .unwrap();
    assert_eq!(goal_change.reason.as_deref(), Some("target revised"));
}

#[tokio::test]
async fn test_measurements_and_recomputation_are_audited() {
    let service = service();
    let user = admin();
    let (revenue, _, okr) = revenue_and_nps(&service, &user).await;

    let kpi_trail = service
        .audit()
        .history(AuditEntityType::Kpi, revenue.id.unwrap())
        .await
        .unwrap();
    assert_eq!(kpi_trail[0].action, AuditAction::Create);
    assert!(kpi_trail
        .iter()
        .any(|e| e.reason.as_deref() == Some("measurement for 2024-03-31")));

    ok(service
        .record_measurement(&user, revenue.id.unwrap(), date(2024, 4, 30), 1_000_000.0, "")
        .await);
    let okr_trail = service
        .audit()
        .history(AuditEntityType::Okr, okr.id.unwrap())
        .await
        .unwrap();
    let recomputed: Vec<_> = okr_trail
        .iter()
        .filter(|e| e.reason.as_deref() == Some("progress recomputed"))
        .collect();
    assert_eq!(recomputed.len(), 2);
    assert!(recomputed.iter().all(|e| e.user_id == 1));
}

#[tokio::test]
async fn test_deleted_kpi_stops_counting() {
    let service = service();
    let user = admin();
    let (_, nps, okr) = revenue_and_nps(&service, &user).await;
    let okr_id = okr.id.unwrap();
    let nps_id = nps.id.unwrap();

    ok(service.delete_kpi(&user, nps_id, Some("survey retired".into())).await);
    assert!(service.kpi(nps_id).is_none());
    let okr = service.okr(okr_id).unwrap();
    assert!(okr.links(nps_id));
    assert_eq!(okr.progress, 95);

    let again = service.delete_kpi(&user, nps_id, None).await;
    assert!(again.is_failure());

    ok(service.restore_kpi(&user, nps_id, None).await);
    assert_eq!(service.okr(okr_id).unwrap().progress, 98);
}

#[tokio::test]
async fn test_deleted_okr_is_hidden() {
    let service = service();
    let user = admin();
    let (_, _, okr) = revenue_and_nps(&service, &user).await;
    let okr_id = okr.id.unwrap();

    ok(service.delete_okr(&user, okr_id, None).await);
    assert!(service.okrs().is_empty());
    assert!(service.link_kpi(&user, okr_id, 1).await.is_failure());
    assert_eq!(service.snapshot().okrs.len(), 1);

    let restored = ok(service.restore_okr(&user, okr_id, None).await);
    assert_eq!(restored.progress, 98);
}

#[tokio::test]
async fn test_action_plan_lifecycle() {
    let service = service();
    let user = admin();
    let (_, nps, _) = revenue_and_nps(&service, &user).await;

    let unknown = service
        .create_action_plan(&user, ActionPlan::new("Ghost", EntityRef::Kpi(99)))
        .await;
    assert!(unknown.errors().has_error("entityId"));

    let plan = ok(service
        .create_action_plan(
            &user,
            ActionPlan::new("Keep NPS up", EntityRef::Kpi(nps.id.unwrap()))
                .with_task(ActionTask::new("Call detractors", Some(1), date(2024, 1, 10))),
        )
        .await);
    let plan_id = plan.id.unwrap();

    let plan = ok(service
        .add_task(&user, plan_id, ActionTask::new("Resurvey", None, date(2024, 12, 1)))
        .await);
    assert_eq!(plan.tasks.len(), 2);
    assert!(service
        .set_task_status(&user, plan_id, 5, TaskStatus::Done)
        .await
        .is_failure());

    assert_eq!(ok(service.mark_overdue_tasks(date(2024, 2, 1)).await), 1);
    assert_eq!(ok(service.mark_overdue_tasks(date(2024, 2, 1)).await), 0);
    assert_eq!(service.dashboard(None).action_plans.overdue_tasks, 1);

    let plan = ok(service.set_task_status(&user, plan_id, 0, TaskStatus::Done).await);
    assert_eq!(plan.completion(), 50);

    ok(service
        .set_plan_status(&user, plan_id, PlanStatusChange::to(ActionPlanStatus::InProgress))
        .await);
    let refused = service
        .set_plan_status(&user, plan_id, PlanStatusChange::to(ActionPlanStatus::Cancelled))
        .await;
    assert!(refused.errors().has_error("cancellationReason"));

    let plan = ok(service
        .set_plan_status(&user, plan_id, PlanStatusChange::cancel("target met early"))
        .await);
    assert_eq!(plan.status, ActionPlanStatus::Cancelled);
    assert_eq!(plan.cancellation_reason.as_deref(), Some("target met early"));

    let closed = service
        .add_task(&user, plan_id, ActionTask::new("Too late", None, date(2024, 12, 1)))
        .await;
    assert!(closed.is_failure());
}

#[tokio::test]
async fn test_export_report_is_audited() {
    let service = service();
    let user = admin();
    revenue_and_nps(&service, &user).await;

    let json = ok(service.export_report(&user, None).await);
    let report: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(report["okrStatus"]["yellow"], 1);
    assert_eq!(report["okrs"][0]["progress"], 98);

    let exports: Vec<_> = service
        .audit()
        .by_user(1)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.action == AuditAction::Export)
        .collect();
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].entity_type, AuditEntityType::Report);
}

#[tokio::test]
async fn test_update_okr_keeps_progress() {
    let service = service();
    let user = admin();
    let (_, _, okr) = revenue_and_nps(&service, &user).await;
    let okr_id = okr.id.unwrap();

    let renamed = ok(service
        .update_okr(&user, okr_id, OkrParams::new().with_title("Grow margins"), None)
        .await);
    assert_eq!(renamed.title, "Grow margins");
    assert_eq!(renamed.progress, 98);

    let invalid = service
        .update_okr(&user, okr_id, OkrParams::new().with_years(2025, 2024), None)
        .await;
    assert!(invalid.is_failure());
    assert_eq!(service.okr(okr_id).unwrap().end_year, 2024);
}

#[tokio::test]
async fn test_forecast_uses_configured_horizon() {
    let service = StrategyService::new(AuditService::in_memory(), ProgressEngine::new(3));
    let user = admin();
    let kpi = ok(service.create_kpi(&user, Kpi::new("Leads", 100.0, 50.0)).await);
    let kpi_id = kpi.id.unwrap();

    assert!(service.forecast(kpi_id, None).unwrap().is_empty());
    for (month, value) in [(1, 10.0), (2, 20.0), (3, 30.0)] {
        ok(service
            .record_measurement(&user, kpi_id, date(2024, month, 1), value, "")
            .await);
    }

    let points = service.forecast(kpi_id, None).unwrap();
    assert_eq!(points.len(), 4);
    assert!(points.iter().all(|p| p.is_forecast));
    assert!(points[3].value > points[1].value);
    assert_eq!(service.forecast(kpi_id, Some(1)).unwrap().len(), 2);
}

#[tokio::test]
async fn test_dashboard_agrees_with_unmeasured_kpi() {
    let service = service();
    let user = admin();
    let kpi = ok(service.create_kpi(&user, Kpi::new("Incidents", 0.0, 10.0)).await);

    let stored = service.kpi(kpi.id.unwrap()).unwrap();
    let report = service.dashboard(None);
    assert_eq!(stored.status, StatusLevel::Red);
    assert_eq!(report.kpi_status.red, 1);
    assert_eq!(report.kpi_status.green, 0);
    assert_eq!(report.awaiting_measurement.len(), 1);
}
