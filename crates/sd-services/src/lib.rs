//! # sd-services
//!
//! Business logic for Stratdash.
//!
//! [`StrategyService`] owns every KPI, OKR and action plan. Each command
//! validates through a contract, applies the change, recomputes affected
//! objectives with the progress engine, writes audit entries and publishes a
//! [`StrategyEvent`].

pub mod events;
pub mod params;
pub mod reports;
pub mod result;
pub mod snapshot;
pub mod strategy;

pub use events::StrategyEvent;
pub use params::{KpiParams, OkrParams};
pub use reports::{DashboardReport, StatusCounts};
pub use result::ServiceResult;
pub use snapshot::StrategySnapshot;
pub use strategy::{StrategyService, SYSTEM_USER_ID};
