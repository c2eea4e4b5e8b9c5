//! Command-line interface
//!
//! - `progress` - progress and status of every objective
//! - `forecast` - projected values of one KPI
//! - `check` - permission decision for one user
//! - `report` - dashboard report as JSON

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sd_core::traits::Id;
use sd_models::{PermissionAction, PermissionModule};
use std::path::PathBuf;

/// Strategy dashboard tooling over a dataset snapshot
#[derive(Parser, Debug)]
#[command(name = "stratdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file layered over the defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Dataset snapshot; overrides the configured path
    #[arg(short = 'D', long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show progress and status of every objective
    Progress {
        /// Evaluate against measurements up to this date
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },

    /// Forecast a KPI from its measurement history
    Forecast {
        /// KPI id
        #[arg(long)]
        kpi: Id,

        /// Monthly periods to project; defaults to the configured horizon
        #[arg(short, long)]
        periods: Option<u32>,
    },

    /// Decide whether a user may perform an action
    Check {
        #[arg(short, long)]
        user: Id,

        /// OKR, KPI, REPORT or SETTINGS
        #[arg(short, long)]
        module: PermissionModule,

        /// VIEW, CREATE, EDIT, DELETE or EXPORT
        #[arg(short, long)]
        action: PermissionAction,
    },

    /// Export the dashboard report as JSON
    Report {
        /// Exporting user; the system user when omitted
        #[arg(short, long)]
        user: Option<Id>,

        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "stratdash", "check", "--user", "5", "--module", "kpi", "--action", "edit",
        ])
        .unwrap();
        match cli.command {
            Commands::Check { user, module, action } => {
                assert_eq!(user, 5);
                assert_eq!(module, PermissionModule::Kpi);
                assert_eq!(action, PermissionAction::Edit);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "stratdash", "progress", "--as-of", "2024-03-31", "--json", "-D", "data.json",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.dataset, Some(PathBuf::from("data.json")));
        assert!(matches!(
            cli.command,
            Commands::Progress { as_of: Some(d) } if d == NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
        ));
    }

    #[test]
    fn test_unknown_module_rejected() {
        let parsed = Cli::try_parse_from([
            "stratdash", "check", "--user", "5", "--module", "budget", "--action", "view",
        ]);
        assert!(parsed.is_err());
    }
}
