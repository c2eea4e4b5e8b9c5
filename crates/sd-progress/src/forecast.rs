//! Linear trend forecasting
//!
//! Ordinary least squares over `(day, value)` pairs, where `day` counts days
//! from the earliest observation. Projections are placed one calendar month
//! apart after the last observation.

use chrono::{Months, NaiveDate};
use sd_models::MeasurementEntry;
use serde::Serialize;

/// One point of a forecast series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub is_forecast: bool,
}

/// Direction of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Flat,
    Falling,
}

/// Share of the mean value a fitted line must move per month to count as a trend
const FLAT_TOLERANCE: f64 = 0.005;
const DAYS_PER_MONTH: f64 = 30.0;
/// Upper bound on the up-front allocation; longer series grow on demand
const PREALLOCATED_MONTHS: u32 = 1200;

#[derive(Debug, Clone, Copy)]
struct LinearFit {
    origin: NaiveDate,
    slope: f64,
    intercept: f64,
    mean: f64,
}

impl LinearFit {
    fn of(history: &[MeasurementEntry]) -> Option<Self> {
        if history.len() < 2 {
            return None;
        }
        let origin = history.iter().map(|e| e.date).min()?;
        let points: Vec<(f64, f64)> = history
            .iter()
            .map(|e| (days_between(origin, e.date), e.value))
            .collect();

        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
            let dx = x - mean_x;
            (sxx + dx * dx, sxy + dx * (y - mean_y))
        });

        // every observation on the same day: no slope to fit
        let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };

        Some(Self {
            origin,
            slope,
            intercept: mean_y - slope * mean_x,
            mean: mean_y,
        })
    }

    fn at(&self, date: NaiveDate) -> f64 {
        self.intercept + self.slope * days_between(self.origin, date)
    }
}

fn days_between(from: NaiveDate, to: NaiveDate) -> f64 {
    to.signed_duration_since(from).num_days() as f64
}

/// Project a KPI history `horizon` months past its last observation
///
/// Returns nothing for fewer than two observations. Otherwise the series
/// starts with an anchor repeating the last observation, followed by one
/// projected point per month. Projected values are rounded and never negative.
pub fn forecast(history: &[MeasurementEntry], horizon: u32) -> Vec<ForecastPoint> {
    let Some(fit) = LinearFit::of(history) else {
        return Vec::new();
    };
    let Some(last) = history
        .iter()
        .enumerate()
        .max_by_key(|(position, entry)| (entry.date, entry.recorded_at, *position))
        .map(|(_, entry)| entry)
    else {
        return Vec::new();
    };

    let mut points = Vec::with_capacity(horizon.min(PREALLOCATED_MONTHS) as usize + 1);
    points.push(ForecastPoint {
        date: last.date,
        value: last.value,
        is_forecast: true,
    });

    for month in 1..=horizon {
        let Some(date) = last.date.checked_add_months(Months::new(month)) else {
            break;
        };
        points.push(ForecastPoint {
            date,
            value: fit.at(date).max(0.0).round(),
            is_forecast: true,
        });
    }

    points
}

/// Direction of the fitted line, or `None` for fewer than two observations
pub fn trend(history: &[MeasurementEntry]) -> Option<Trend> {
    let fit = LinearFit::of(history)?;
    let monthly_change = fit.slope * DAYS_PER_MONTH;
    let tolerance = (fit.mean.abs() * FLAT_TOLERANCE).max(f64::EPSILON);

    Some(if monthly_change.abs() <= tolerance {
        Trend::Flat
    } else if monthly_change > 0.0 {
        Trend::Rising
    } else {
        Trend::Falling
    })
}
