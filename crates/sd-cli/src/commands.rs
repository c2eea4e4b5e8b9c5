//! Command implementations

use anyhow::{bail, Context};
use chrono::NaiveDate;
use sd_audit::AuditService;
use sd_auth::{CurrentUser, RoleDirectory};
use sd_core::config::AppConfig;
use sd_core::traits::Id;
use sd_models::{PermissionAction, PermissionModule, User};
use sd_progress::ProgressEngine;
use sd_services::{StrategyService, SYSTEM_USER_ID};
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::dataset::{find_user, Dataset};

/// Everything a command may need, loaded once
struct Workspace {
    service: StrategyService,
    directory: RoleDirectory,
    users: Vec<User>,
    config: AppConfig,
    json: bool,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let path = cli
        .dataset
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.dataset.path));
    let (snapshot, directory, users) = Dataset::load(&path)?.split();

    let engine = ProgressEngine::from_config(&config);
    let workspace = Workspace {
        service: StrategyService::from_snapshot(snapshot, AuditService::in_memory(), engine),
        directory,
        users,
        config,
        json: cli.json,
    };

    match cli.command {
        Commands::Progress { as_of } => workspace.progress(as_of),
        Commands::Forecast { kpi, periods } => workspace.forecast(kpi, periods),
        Commands::Check { user, module, action } => workspace.check(user, module, action),
        Commands::Report { user, as_of } => workspace.report(user, as_of).await,
    }
}

impl Workspace {
    fn progress(&self, as_of: Option<NaiveDate>) -> anyhow::Result<()> {
        let mut rows = Vec::new();
        for okr in self.service.okrs() {
            let Some(id) = okr.id else { continue };
            let progress = match as_of {
                Some(date) => self.service.okr_progress_as_of(id, date)?,
                None => sd_progress::ObjectiveProgress {
                    progress: okr.progress,
                    status: okr.status,
                },
            };
            rows.push((id, okr.title, progress));
        }

        if self.json {
            let rows: Vec<_> = rows
                .iter()
                .map(|(id, title, p)| json!({ "id": id, "title": title, "progress": p.progress, "status": p.status }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if rows.is_empty() {
            println!("No objectives");
        }
        for (id, title, p) in rows {
            println!("#{:<4} {:<40} {:>3}%  {}", id, title, p.progress, p.status);
        }
        Ok(())
    }

    fn forecast(&self, kpi_id: Id, periods: Option<u32>) -> anyhow::Result<()> {
        let kpi = self
            .service
            .kpi(kpi_id)
            .with_context(|| format!("KPI {} not found", kpi_id))?;
        let points = self.service.forecast(kpi_id, periods)?;
        let trend = self.service.engine().trend(&kpi);

        if self.json {
            let out = json!({ "kpiId": kpi_id, "name": kpi.name, "trend": trend, "points": points });
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }

        if points.is_empty() {
            println!("{}: not enough history to forecast", kpi.name);
            return Ok(());
        }
        println!("{} (goal {})", kpi.name, format_value(kpi.goal, &kpi.unit, &self.config));
        for point in points {
            let marker = if point.is_forecast { "forecast" } else { "" };
            println!(
                "  {}  {:>14}  {}",
                point.date.format(&self.config.instance.date_format),
                format_value(point.value, &kpi.unit, &self.config),
                marker
            );
        }
        if let Some(trend) = trend {
            println!("  trend: {:?}", trend);
        }
        Ok(())
    }

    fn check(&self, user_id: Id, module: PermissionModule, action: PermissionAction) -> anyhow::Result<()> {
        let user = find_user(&self.users, user_id);
        if user.is_none() {
            debug!(user_id, "Unknown user, denying");
        }
        let allowed = self.directory.check_permission(user, module, action);

        if self.json {
            let out = json!({ "userId": user_id, "module": module, "action": action, "allowed": allowed });
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            let verdict = if allowed { "allowed" } else { "denied" };
            println!("user {} {} {}: {}", user_id, action, module, verdict);
        }
        Ok(())
    }

    async fn report(&self, user_id: Option<Id>, as_of: Option<NaiveDate>) -> anyhow::Result<()> {
        let user = match user_id {
            Some(id) => {
                let user = find_user(&self.users, id).with_context(|| format!("user {} not found", id))?;
                CurrentUser::resolve(&self.directory, user)
            }
            None => CurrentUser::admin(SYSTEM_USER_ID, "system"),
        };

        let exported = self.service.export_report(&user, as_of).await;
        let Some(rendered) = exported.result() else {
            bail!("report export refused: {}", exported.full_messages().join("; "));
        };
        println!("{}", rendered);
        Ok(())
    }
}

/// Money units get two decimals and a prefix, anything else a suffix
fn format_value(value: f64, unit: &str, config: &AppConfig) -> String {
    let unit = unit.trim();
    if config.is_currency_unit(unit) {
        format!("{} {:.2}", unit, value)
    } else if unit.is_empty() {
        format!("{}", value)
    } else {
        format!("{} {}", value, unit)
    }
}
