use chrono::{Duration, NaiveDate};

use crate::models::{CycleRecord, FertilityLevel, PredictionResult};

pub const DEFAULT_CYCLE_LENGTH: i64 = 28;
pub const DEFAULT_PERIOD_LENGTH: i64 = 5;
/// Days between ovulation and the next period.
pub const LUTEAL_PHASE_DAYS: i64 = 14;
pub const FERTILE_WINDOW_RADIUS: i64 = 2;

/// Result returned when there is no history at all.
pub fn no_data() -> PredictionResult {
    PredictionResult {
        next_period_date: None,
        next_ovulation_date: None,
        average_cycle_length: DEFAULT_CYCLE_LENGTH,
        average_period_length: DEFAULT_PERIOD_LENGTH,
        current_day: 0,
        fertility_level: FertilityLevel::Low,
    }
}

/// Predict where `today` falls in the latest cycle and when the next period and
/// ovulation are due. Records may be in any order; malformed ones are tolerated.
pub fn predict(records: &[CycleRecord], today: NaiveDate) -> PredictionResult {
    let Some(last) = records.iter().max_by_key(|c| c.start) else {
        return no_data();
    };

    let average_cycle_length = average_completed_length(records);

    let elapsed = (today - last.start).num_days();
    let current_day = (elapsed + 1).clamp(1, average_cycle_length.max(1));

    let next_period_date = last
        .start
        .checked_add_signed(Duration::days(average_cycle_length));
    let next_ovulation_date = next_period_date
        .and_then(|d| d.checked_sub_signed(Duration::days(LUTEAL_PHASE_DAYS)));

    PredictionResult {
        next_period_date,
        next_ovulation_date,
        average_cycle_length,
        average_period_length: DEFAULT_PERIOD_LENGTH,
        current_day,
        fertility_level: fertility_level(current_day, average_cycle_length),
    }
}

/// Rounded mean `length` over completed cycles, or the default when none are completed.
pub fn average_completed_length(records: &[CycleRecord]) -> i64 {
    let lengths: Vec<i64> = records
        .iter()
        .filter(|c| c.is_completed())
        .filter_map(|c| c.length.map(i64::from))
        .collect();

    if lengths.is_empty() {
        return DEFAULT_CYCLE_LENGTH;
    }
    (lengths.iter().sum::<i64>() as f64 / lengths.len() as f64).round() as i64
}

pub fn fertility_level(current_day: i64, average_cycle_length: i64) -> FertilityLevel {
    let ovulation_day = average_cycle_length - LUTEAL_PHASE_DAYS;
    let window = (ovulation_day - FERTILE_WINDOW_RADIUS)..=(ovulation_day + FERTILE_WINDOW_RADIUS);

    if current_day == ovulation_day {
        FertilityLevel::High
    } else if window.contains(&current_day) {
        FertilityLevel::Medium
    } else {
        FertilityLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn completed(start: &str, length: i32) -> CycleRecord {
        let start = date(start);
        CycleRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            start,
            end: Some(start + Duration::days(4)),
            length: Some(length),
            ovulation_date: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn open(start: &str) -> CycleRecord {
        CycleRecord {
            end: None,
            length: None,
            ..completed(start, 0)
        }
    }

    #[test]
    fn empty_history_returns_sentinel() {
        let result = predict(&[], date("2025-01-15"));
        assert_eq!(result, no_data());
        assert!(result.is_sentinel());
        assert_eq!(result.average_cycle_length, 28);
        assert_eq!(result.average_period_length, 5);
        assert_eq!(result.next_period_date, None);
        assert_eq!(result.next_ovulation_date, None);
        assert_eq!(result.fertility_level, FertilityLevel::Low);
    }

    #[test]
    fn single_completed_cycle() {
        let cycles = vec![completed("2025-01-01", 28)];
        let result = predict(&cycles, date("2025-01-15"));

        assert_eq!(
            result,
            PredictionResult {
                next_period_date: Some(date("2025-01-29")),
                next_ovulation_date: Some(date("2025-01-15")),
                average_cycle_length: 28,
                average_period_length: 5,
                current_day: 15,
                fertility_level: FertilityLevel::Medium,
            }
        );
        assert!(!result.is_sentinel());
    }

    #[test]
    fn current_day_saturates_at_average_length() {
        let cycles = vec![completed("2025-01-01", 28)];
        let result = predict(&cycles, date("2025-03-01"));
        assert_eq!(result.current_day, 28);
    }

    #[test]
    fn current_day_is_at_least_one_before_cycle_start() {
        let cycles = vec![completed("2025-01-10", 28)];
        let result = predict(&cycles, date("2025-01-01"));
        assert_eq!(result.current_day, 1);
    }

    #[test]
    fn averages_completed_cycles_only() {
        let cycles = vec![
            completed("2025-01-01", 28),
            completed("2025-01-29", 30),
            completed("2025-02-28", 26),
            open("2025-03-26"),
        ];
        let result = predict(&cycles, date("2025-03-30"));
        assert_eq!(result.average_cycle_length, 28);
        assert_eq!(result.current_day, 5);
        assert_eq!(result.next_period_date, Some(date("2025-04-23")));
    }

    #[test]
    fn mean_rounds_half_up() {
        let cycles = vec![completed("2025-01-01", 29), completed("2025-01-30", 30)];
        assert_eq!(average_completed_length(&cycles), 30);
    }

    #[test]
    fn zero_length_is_not_completed_but_negative_is() {
        let cycles = vec![completed("2025-01-01", 28), completed("2025-01-29", 0)];
        let result = predict(&cycles, date("2025-02-05"));
        assert_eq!(result.average_cycle_length, 28);
        assert_eq!(result.current_day, 8);
        assert_eq!(result.next_period_date, Some(date("2025-02-26")));

        let cycles = vec![completed("2025-01-01", 30), completed("2025-01-31", -10)];
        assert_eq!(average_completed_length(&cycles), 10);
    }

    #[test]
    fn length_without_end_is_not_completed() {
        let mut partial = completed("2025-01-01", 40);
        partial.end = None;
        let cycles = vec![partial, completed("2025-02-10", 30)];
        assert_eq!(average_completed_length(&cycles), 30);
    }

    #[test]
    fn most_recent_start_is_reference_regardless_of_order() {
        let cycles = vec![
            completed("2025-02-01", 28),
            open("2025-03-01"),
            completed("2025-01-04", 28),
        ];
        let result = predict(&cycles, date("2025-03-03"));
        assert_eq!(result.current_day, 3);
        assert_eq!(result.next_period_date, Some(date("2025-03-29")));
        assert_eq!(result.next_ovulation_date, Some(date("2025-03-15")));
    }

    #[test]
    fn single_open_cycle_uses_default_length() {
        let result = predict(&[open("2025-05-01")], date("2025-05-10"));
        assert_eq!(result.average_cycle_length, 28);
        assert_eq!(result.current_day, 10);
        assert_eq!(result.next_period_date, Some(date("2025-05-29")));
    }

    #[test]
    fn fertility_window_around_ovulation_day() {
        assert_eq!(fertility_level(14, 28), FertilityLevel::High);
        assert_eq!(fertility_level(12, 28), FertilityLevel::Medium);
        assert_eq!(fertility_level(16, 28), FertilityLevel::Medium);
        assert_eq!(fertility_level(11, 28), FertilityLevel::Low);
        assert_eq!(fertility_level(17, 28), FertilityLevel::Low);
        assert_eq!(fertility_level(20, 28), FertilityLevel::Low);
    }

    #[test]
    fn fertility_follows_predicted_day() {
        let cycles = vec![completed("2025-01-01", 28)];
        let high = predict(&cycles, date("2025-01-14"));
        assert_eq!(high.current_day, 14);
        assert_eq!(high.fertility_level, FertilityLevel::High);

        let low = predict(&cycles, date("2025-01-20"));
        assert_eq!(low.fertility_level, FertilityLevel::Low);
    }

    #[test]
    fn observed_ovulation_date_is_ignored() {
        let mut cycle = completed("2025-01-01", 28);
        cycle.ovulation_date = Some(date("2025-01-10"));
        let result = predict(&[cycle], date("2025-01-05"));
        assert_eq!(result.next_ovulation_date, Some(date("2025-01-15")));
    }

    #[test]
    fn malformed_records_do_not_panic() {
        let mut inverted = completed("2025-01-10", -5);
        inverted.end = Some(date("2025-01-01"));
        let result = predict(&[inverted], date("2025-01-20"));

        assert_eq!(result.average_cycle_length, -5);
        assert_eq!(result.current_day, 1);
        assert_eq!(result.next_period_date, Some(date("2025-01-05")));
        assert_eq!(result.fertility_level, FertilityLevel::Low);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let cycles = vec![completed("2025-01-01", 27), open("2025-01-28")];
        let today = date("2025-02-08");
        assert_eq!(predict(&cycles, today), predict(&cycles, today));
    }

    #[test]
    fn current_day_is_monotonic_until_clamped() {
        let cycles = vec![completed("2025-01-01", 28)];
        let start = date("2025-01-01");
        let mut previous = 0;
        for offset in 0..60 {
            let day = predict(&cycles, start + Duration::days(offset)).current_day;
            assert!(day >= previous);
            if offset >= 27 {
                assert_eq!(day, 28);
            }
            previous = day;
        }
    }
}
