//! Completion percentage and status derivation
//!
//! Two threshold rules coexist on purpose:
//! - [`status_for`] compares the raw `value / goal` ratio, uncapped.
//! - [`objective_progress`] derives status from the rounded weighted average of
//!   per-KPI percentages that were each capped at 100 first.

use chrono::NaiveDate;
use sd_models::{Kpi, Okr, StatusLevel};
use serde::Serialize;

use crate::history::value_as_of;

const GREEN_RATIO: f64 = 1.0;
const YELLOW_RATIO: f64 = 0.9;

/// Completion of a value against its goal, as a percentage in `[0, 100]`
///
/// A zero goal yields 0.
pub fn kpi_progress(value: f64, goal: f64) -> f64 {
    if goal == 0.0 {
        return 0.0;
    }
    (value / goal * 100.0).clamp(0.0, 100.0)
}

/// Traffic-light status of a KPI value against its goal
///
/// A zero goal is treated as met.
pub fn status_for(value: f64, goal: f64) -> StatusLevel {
    if goal == 0.0 {
        return StatusLevel::Green;
    }
    let ratio = value / goal;
    if ratio >= GREEN_RATIO {
        StatusLevel::Green
    } else if ratio >= YELLOW_RATIO {
        StatusLevel::Yellow
    } else {
        StatusLevel::Red
    }
}

/// Status of an already computed percentage
pub fn status_for_progress(progress: f64) -> StatusLevel {
    if progress >= 100.0 {
        StatusLevel::Green
    } else if progress >= 90.0 {
        StatusLevel::Yellow
    } else {
        StatusLevel::Red
    }
}

/// Aggregated completion of an objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveProgress {
    pub progress: u8,
    pub status: StatusLevel,
}

impl ObjectiveProgress {
    /// Result for an objective with nothing to aggregate
    pub const EMPTY: ObjectiveProgress = ObjectiveProgress {
        progress: 0,
        status: StatusLevel::Red,
    };
}

/// Weighted completion of an objective over its linked KPIs
///
/// Only KPIs in `kpi_pool` whose id is linked to the objective take part.
/// Without `as_of` each KPI contributes its current value; with a date it
/// contributes its value as of that date. Weights are normalized by their
/// own sum, so they need not add up to 100.
pub fn objective_progress(
    objective: &Okr,
    kpi_pool: &[Kpi],
    as_of: Option<NaiveDate>,
) -> ObjectiveProgress {
    let linked = kpi_pool
        .iter()
        .filter(|kpi| kpi.id.is_some_and(|id| objective.kpi_ids.contains(&id)));

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut linked_count = 0usize;

    for kpi in linked {
        let value = match as_of {
            Some(date) => value_as_of(&kpi.history, date),
            None => kpi.current_value,
        };
        weighted_sum += kpi_progress(value, kpi.goal) * kpi.weight;
        total_weight += kpi.weight;
        linked_count += 1;
    }

    if linked_count == 0 || total_weight <= 0.0 {
        return ObjectiveProgress::EMPTY;
    }

    let progress = (weighted_sum / total_weight).round().clamp(0.0, 100.0);
    ObjectiveProgress {
        progress: progress as u8,
        status: status_for_progress(progress),
    }
}

/// Value, completion and status of a single KPI
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    pub value: f64,
    pub progress: f64,
    pub status: StatusLevel,
}

/// Evaluate a KPI now, or as of a past date
pub fn kpi_snapshot(kpi: &Kpi, as_of: Option<NaiveDate>) -> KpiSnapshot {
    let value = match as_of {
        Some(date) => value_as_of(&kpi.history, date),
        None => kpi.current_value,
    };
    KpiSnapshot {
        value,
        progress: kpi_progress(value, kpi.goal),
        status: status_for(value, kpi.goal),
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
    fn test_kpi_progress_bounds() {
        assert_eq!(kpi_progress(50.0, 100.0), 50.0);
        assert_eq!(kpi_progress(100.0, 100.0), 100.0);
        assert_eq!(kpi_progress(0.0, 100.0), 0.0);
        assert_eq!(kpi_progress(250.0, 100.0), 100.0);
        assert_eq!(kpi_progress(-5.0, 100.0), 0.0);
        for goal in [0.5, 1.0, 60.0, 1_000_000.0] {
            for value in [0.0, 0.1, goal / 3.0, goal, goal * 7.0] {
                let p = kpi_progress(value, goal);
                assert!((0.0..=100.0).contains(&p), "{} / {} -> {}", value, goal, p);
            }
            assert_eq!(kpi_progress(goal, goal), 100.0);
        }
    }

    #[test]
    fn test_kpi_progress_zero_goal() {
        for value in [-3.0, 0.0, 42.0] {
            assert_eq!(kpi_progress(value, 0.0), 0.0);
        }
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(status_for(100.0, 100.0), StatusLevel::Green);
        assert_eq!(status_for(91.0, 100.0), StatusLevel::Yellow);
        assert_eq!(status_for(90.0, 100.0), StatusLevel::Yellow);
        assert_eq!(status_for(89.0, 100.0), StatusLevel::Red);
        assert_eq!(status_for(150.0, 100.0), StatusLevel::Green);
    }

    #[test]
    fn test_status_zero_goal_is_green() {
        for value in [-1.0, 0.0, 12.5] {
            assert_eq!(status_for(value, 0.0), StatusLevel::Green);
        }
    }

    #[test]
    fn test_objective_without_kpis() {
        let okr = Okr::new("Empty", 2024);
        let pool = vec![Kpi::new("Unlinked", 10.0, 50.0).with_id(1).with_current_value(10.0)];
        assert_eq!(objective_progress(&okr, &pool, None), ObjectiveProgress::EMPTY);

        let linked_but_missing = Okr::new("Dangling", 2024).with_kpis([99]);
        assert_eq!(
            objective_progress(&linked_but_missing, &pool, None),
            ObjectiveProgress::EMPTY
        );
    }

    #[test]
    fn test_single_kpi_at_goal() {
        let okr = Okr::new("Single", 2024).with_kpis([1]);
        let pool = vec![Kpi::new("K", 200.0, 40.0).with_id(1).with_current_value(200.0)];
        assert_eq!(
            objective_progress(&okr, &pool, None),
            ObjectiveProgress {
                progress: 100,
                status: StatusLevel::Green
            }
        );
    }

    #[test]
    fn test_two_equal_weights() {
        let okr = Okr::new("Half", 2024).with_kpis([1, 2]);
        let pool = vec![
            Kpi::new("Done", 10.0, 50.0).with_id(1).with_current_value(10.0),
            Kpi::new("Not started", 10.0, 50.0).with_id(2),
        ];
        assert_eq!(
            objective_progress(&okr, &pool, None),
            ObjectiveProgress {
                progress: 50,
                status: StatusLevel::Red
            }
        );
    }

    #[test]
    fn test_weights_normalized_by_their_sum() {
        let okr = Okr::new("Small weights", 2024).with_kpis([1, 2]);
        let pool = vec![
            Kpi::new("A", 10.0, 3.0).with_id(1).with_current_value(10.0),
            Kpi::new("B", 10.0, 1.0).with_id(2),
        ];
        assert_eq!(objective_progress(&okr, &pool, None).progress, 75);
    }

    #[test]
    fn test_zero_total_weight() {
        let okr = Okr::new("Weightless", 2024).with_kpis([1]);
        let pool = vec![Kpi::new("A", 10.0, 0.0).with_id(1).with_current_value(10.0)];
        assert_eq!(objective_progress(&okr, &pool, None), ObjectiveProgress::EMPTY);
    }

    #[test]
    fn test_revenue_nps_scenario() {
        let okr = Okr::new("Grow sustainably", 2024).with_kpis([1, 2]);
        let mut pool = vec![
            Kpi::new("Revenue", 1_000_000.0, 40.0)
                .with_id(1)
                .with_current_value(950_000.0),
            Kpi::new("NPS", 60.0, 60.0).with_id(2).with_current_value(65.0),
        ];

        assert_eq!(status_for(950_000.0, 1_000_000.0), StatusLevel::Yellow);
        assert_eq!(status_for(65.0, 60.0), StatusLevel::Green);
        assert_eq!(
            objective_progress(&okr, &pool, None),
            ObjectiveProgress {
                progress: 98,
                status: StatusLevel::Yellow
            }
        );

        pool[0].current_value = 1_000_000.0;
        assert_eq!(
            objective_progress(&okr, &pool, None),
            ObjectiveProgress {
                progress: 100,
                status: StatusLevel::Green
            }
        );
    }

    #[test]
    fn test_objective_as_of_date() {
        let okr = Okr::new("History", 2024).with_kpis([1]);
        let kpi = Kpi::new("Sales", 100.0, 50.0)
            .with_id(1)
            .with_current_value(100.0)
            .with_history(vec![
                MeasurementEntry::new(date(2024, 1, 31), 40.0, 1),
                MeasurementEntry::new(date(2024, 2, 29), 95.0, 1),
                MeasurementEntry::new(date(2024, 3, 31), 100.0, 1),
            ]);
        let pool = vec![kpi];

        let jan = objective_progress(&okr, &pool, Some(date(2024, 2, 15)));
        assert_eq!(jan.progress, 40);
        assert_eq!(jan.status, StatusLevel::Red);

        let feb = objective_progress(&okr, &pool, Some(date(2024, 3, 1)));
        assert_eq!(feb.progress, 95);
        assert_eq!(feb.status, StatusLevel::Yellow);

        let before = objective_progress(&okr, &pool, Some(date(2023, 12, 31)));
        assert_eq!(before.progress, 0);
    }

    #[test]
    fn test_kpi_snapshot() {
        let kpi = Kpi::new("Revenue", 1000.0, 40.0)
            .with_current_value(1200.0)
            .with_history(vec![MeasurementEntry::new(date(2024, 1, 1), 900.0, 1)]);

        let now = kpi_snapshot(&kpi, None);
        assert_eq!(now.value, 1200.0);
        assert_eq!(now.progress, 100.0);
        assert_eq!(now.status, StatusLevel::Green);

        let then = kpi_snapshot(&kpi, Some(date(2024, 1, 15)));
        assert_eq!(then.value, 900.0);
        assert_eq!(then.progress, 90.0);
        assert_eq!(then.status, StatusLevel::Yellow);
    }
}
