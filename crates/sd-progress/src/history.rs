//! Point-in-time lookup over a measurement history

use chrono::NaiveDate;
use sd_models::{Kpi, MeasurementEntry};

/// Value of a KPI as of `date`
pub fn historical_value(kpi: &Kpi, date: NaiveDate) -> f64 {
    value_as_of(&kpi.history, date)
}

/// Value of the newest entry whose reference date is on or before `date`
///
/// Entries may be stored in any order. When several entries share the winning
/// date, the one recorded last wins. Returns 0 when nothing qualifies.
pub fn value_as_of(history: &[MeasurementEntry], date: NaiveDate) -> f64 {
    history
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.date <= date)
        .max_by_key(|(position, entry)| (entry.date, entry.recorded_at, *position))
        .map(|(_, entry)| entry.value)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_history() -> Vec<MeasurementEntry> {
        // deliberately out of order
        vec![
            MeasurementEntry::new(date(2024, 3, 31), 30.0, 1),
            MeasurementEntry::new(date(2024, 1, 31), 10.0, 1),
            MeasurementEntry::new(date(2024, 2, 29), 20.0, 1),
        ]
    }

    #[test]
    fn test_value_between_entries() {
        let history = sample_history();
        assert_eq!(value_as_of(&history, date(2024, 2, 15)), 10.0);
        assert_eq!(value_as_of(&history, date(2024, 3, 15)), 20.0);
        assert_eq!(value_as_of(&history, date(2025, 1, 1)), 30.0);
    }

    #[test]
    fn test_value_on_exact_date() {
        let history = sample_history();
        assert_eq!(value_as_of(&history, date(2024, 2, 29)), 20.0);
    }

    #[test]
    fn test_before_first_entry_is_zero() {
        assert_eq!(value_as_of(&sample_history(), date(2023, 12, 31)), 0.0);
        assert_eq!(value_as_of(&[], date(2024, 6, 1)), 0.0);
    }

    #[test]
    fn test_same_date_latest_recording_wins() {
        let first = MeasurementEntry::new(date(2024, 1, 31), 10.0, 1);
        let mut correction = MeasurementEntry::new(date(2024, 1, 31), 12.0, 2);
        correction.recorded_at = Utc::now() + Duration::minutes(5);

        let history = vec![correction, first];
        assert_eq!(value_as_of(&history, date(2024, 2, 1)), 12.0);
    }

    #[test]
    fn test_historical_value_reads_kpi_history() {
        let kpi = Kpi::new("Revenue", 100.0, 50.0)
            .with_current_value(30.0)
            .with_history(sample_history());
        assert_eq!(historical_value(&kpi, date(2024, 2, 1)), 10.0);
    }
}
