//! # sd-progress
//!
//! Completion percentage and traffic-light status for KPIs and objectives,
//! historical value lookup, and trend forecasting.
//!
//! Every function here is total: zero goals, empty histories and objectives
//! without KPIs all have a defined result instead of an error.

pub mod engine;
pub mod forecast;
pub mod history;
pub mod progress;

pub use engine::ProgressEngine;
pub use forecast::{forecast, trend, ForecastPoint, Trend};
pub use history::{historical_value, value_as_of};
pub use progress::{
    kpi_progress, kpi_snapshot, objective_progress, status_for, status_for_progress, KpiSnapshot,
    ObjectiveProgress,
};
