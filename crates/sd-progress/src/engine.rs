//! Configured entry point over the progress functions

use chrono::NaiveDate;
use sd_core::config::AppConfig;
use sd_models::{Kpi, Okr};

use crate::forecast::{self, ForecastPoint, Trend};
use crate::progress::{self, KpiSnapshot, ObjectiveProgress};

/// Progress engine carrying the instance's forecast settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEngine {
    forecast_horizon: u32,
}

impl Default for ProgressEngine {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl ProgressEngine {
    pub fn new(forecast_horizon: u32) -> Self {
        Self { forecast_horizon }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.progress.forecast_horizon)
    }

    pub fn forecast_horizon(&self) -> u32 {
        self.forecast_horizon
    }

    pub fn kpi(&self, kpi: &Kpi, as_of: Option<NaiveDate>) -> KpiSnapshot {
        progress::kpi_snapshot(kpi, as_of)
    }

    pub fn objective(&self, okr: &Okr, kpis: &[Kpi], as_of: Option<NaiveDate>) -> ObjectiveProgress {
        progress::objective_progress(okr, kpis, as_of)
    }

    /// Forecast over the configured horizon
    pub fn forecast(&self, kpi: &Kpi) -> Vec<ForecastPoint> {
        forecast::forecast(&kpi.history, self.forecast_horizon)
    }

    /// Forecast over an explicit horizon
    pub fn forecast_for(&self, kpi: &Kpi, horizon: u32) -> Vec<ForecastPoint> {
        forecast::forecast(&kpi.history, horizon)
    }

    pub fn trend(&self, kpi: &Kpi) -> Option<Trend> {
        forecast::trend(&kpi.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_models::MeasurementEntry;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_horizon_comes_from_config() {
        let engine = ProgressEngine::default();
        assert_eq!(engine.forecast_horizon(), AppConfig::default().progress.forecast_horizon);
    }

    #[test]
    fn test_forecast_uses_configured_horizon() {
        let kpi = Kpi::new("Leads", 100.0, 50.0).with_history(vec![
            MeasurementEntry::new(date(2024, 1, 1), 10.0, 1),
            MeasurementEntry::new(date(2024, 2, 1), 20.0, 1),
        ]);
        let engine = ProgressEngine::new(3);

        assert_eq!(engine.forecast(&kpi).len(), 4);
        assert_eq!(engine.forecast_for(&kpi, 12).len(), 13);
        assert_eq!(engine.trend(&kpi), Some(Trend::Rising));
    }
}
