use chrono::{Duration, NaiveDate};

use crate::models::{CycleLength, CyclePhase, CyclePrediction, CycleStats, FertilityWindow, PeriodRecord, PhaseInfo};

/// Assumed bleed length used for every prediction.
pub const PERIOD_LENGTH_DAYS: i64 = 5;
/// Assumed days from ovulation to the next period.
pub const LUTEAL_PHASE_DAYS: i64 = 14;
pub const OVULATION_WINDOW_DAYS: i64 = 2;
/// Fertile days counted before predicted ovulation starts.
pub const FERTILE_DAYS_BEFORE_OVULATION: i64 = 5;
/// Fixed, not derived from cycle variance.
pub const CONFIDENCE_SCORE: f64 = 0.85;

/// Classify `today` relative to the last confirmed period start.
///
/// Day 1 is the start day itself. A start date in the future yields a
/// non-positive day and lands in the menstrual bucket.
pub fn classify_current_phase(last_period_start: Option<NaiveDate>, today: NaiveDate) -> PhaseInfo {
    let Some(start) = last_period_start else {
        return PhaseInfo {
            phase: CyclePhase::Unknown,
            day_in_cycle: 0,
        };
    };

    let days_since_start = (today - start).num_days();
    let phase = match days_since_start {
        d if d <= 5 => CyclePhase::Menstrual,
        6..=13 => CyclePhase::Follicular,
        14..=16 => CyclePhase::Ovulation,
        _ => CyclePhase::Luteal,
    };

    PhaseInfo {
        phase,
        day_in_cycle: days_since_start + 1,
    }
}

/// Project the next period and ovulation window from the last start.
pub fn predict(last_period_start: NaiveDate, cycle_length: CycleLength) -> CyclePrediction {
    let predicted_period_start = last_period_start + Duration::days(cycle_length.days());
    let predicted_ovulation_start = predicted_period_start - Duration::days(LUTEAL_PHASE_DAYS);

    CyclePrediction {
        predicted_period_start,
        predicted_period_end: predicted_period_start + Duration::days(PERIOD_LENGTH_DAYS),
        predicted_ovulation_start,
        predicted_ovulation_end: predicted_ovulation_start + Duration::days(OVULATION_WINDOW_DAYS),
        confidence_score: CONFIDENCE_SCORE,
    }
}

pub fn fertility_window(prediction: &CyclePrediction) -> FertilityWindow {
    FertilityWindow {
        start: prediction.predicted_ovulation_start - Duration::days(FERTILE_DAYS_BEFORE_OVULATION),
        end: prediction.predicted_ovulation_end,
    }
}

/// Whole days from one period start to the next.
pub fn cycle_length_between(previous_start: NaiveDate, new_start: NaiveDate) -> i64 {
    (new_start - previous_start).num_days()
}

/// Mean and sample standard deviation of the recorded cycle lengths.
///
/// Records without a cycle length are skipped. Both values are `None` until
/// at least two lengths are known.
pub fn average_cycle_stats(history: &[PeriodRecord]) -> CycleStats {
    let lengths: Vec<f64> = history
        .iter()
        .filter_map(|r| r.cycle_length_days)
        .map(|d| d as f64)
        .collect();

    if lengths.len() < 2 {
        return CycleStats {
            mean_length_days: None,
            std_dev_days: None,
            samples: lengths.len(),
        };
    }

    let n = lengths.len() as f64;
    let mean = lengths.iter().sum::<f64>() / n;
    let variance = lengths.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    CycleStats {
        mean_length_days: Some(mean),
        std_dev_days: Some(variance.sqrt()),
        samples: lengths.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record_with_length(start: &str, length: Option<i64>) -> PeriodRecord {
        PeriodRecord {
            cycle_length_days: length,
            ..PeriodRecord::new(date(start))
        }
    }

    #[test]
    fn phase_buckets() {
        let start = date("2024-05-01");
        for days in 0..=5 {
            let info = classify_current_phase(Some(start), start + Duration::days(days));
            assert_eq!(info.phase, CyclePhase::Menstrual, "day offset {}", days);
            assert_eq!(info.day_in_cycle, days + 1);
        }
        for days in 6..=13 {
            let info = classify_current_phase(Some(start), start + Duration::days(days));
            assert_eq!(info.phase, CyclePhase::Follicular, "day offset {}", days);
        }
        for days in 14..=16 {
            let info = classify_current_phase(Some(start), start + Duration::days(days));
            assert_eq!(info.phase, CyclePhase::Ovulation, "day offset {}", days);
        }
        for days in [17, 20, 28, 45, 400] {
            let info = classify_current_phase(Some(start), start + Duration::days(days));
            assert_eq!(info.phase, CyclePhase::Luteal, "day offset {}", days);
        }
    }

    #[test]
    fn no_period_means_unknown() {
        let info = classify_current_phase(None, date("2024-05-01"));
        assert_eq!(info.phase, CyclePhase::Unknown);
        assert_eq!(info.day_in_cycle, 0);
    }

    #[test]
    fn future_start_falls_into_menstrual() {
        let info = classify_current_phase(Some(date("2024-05-10")), date("2024-05-01"));
        assert_eq!(info.phase, CyclePhase::Menstrual);
        assert_eq!(info.day_in_cycle, -8);
    }

    #[test]
    fn predicts_from_28_day_cycle() {
        let prediction = predict(date("2024-01-01"), CycleLength::new(28).unwrap());
        assert_eq!(prediction.predicted_period_start, date("2024-01-29"));
        assert_eq!(prediction.predicted_period_end, date("2024-02-03"));
        assert_eq!(prediction.predicted_ovulation_start, date("2024-01-15"));
        assert_eq!(prediction.predicted_ovulation_end, date("2024-01-17"));
        assert_eq!(prediction.confidence_score, 0.85);
    }

    #[test]
    fn short_cycle_puts_ovulation_before_last_start() {
        let prediction = predict(date("2024-01-01"), CycleLength::new(10).unwrap());
        assert_eq!(prediction.predicted_ovulation_start, date("2023-12-28"));
    }

    #[test]
    fn fertility_window_spans_ovulation() {
        let prediction = predict(date("2024-01-01"), CycleLength::new(28).unwrap());
        let window = fertility_window(&prediction);
        assert_eq!(window.start, date("2024-01-10"));
        assert_eq!(window.end, date("2024-01-17"));
        assert!(window.contains(date("2024-01-15")));
        assert!(!window.contains(date("2024-01-18")));
    }

    #[test]
    fn cycle_length_between_starts() {
        assert_eq!(cycle_length_between(date("2024-01-01"), date("2024-01-31")), 30);
        assert_eq!(cycle_length_between(date("2024-01-31"), date("2024-01-01")), -30);
    }

    #[test]
    fn average_stats_use_sample_deviation() {
        let history = vec![
            record_with_length("2024-04-24", Some(26)),
            record_with_length("2024-03-25", Some(30)),
            record_with_length("2024-02-26", Some(28)),
            record_with_length("2024-01-29", None),
        ];
        let stats = average_cycle_stats(&history);
        assert_eq!(stats.samples, 3);
        assert!((stats.mean_length_days.unwrap() - 28.0).abs() < 1e-9);
        assert!((stats.std_dev_days.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn average_stats_absent_below_two_lengths() {
        let history = vec![
            record_with_length("2024-02-26", Some(28)),
            record_with_length("2024-01-29", None),
        ];
        let stats = average_cycle_stats(&history);
        assert_eq!(stats.mean_length_days, None);
        assert_eq!(stats.std_dev_days, None);
        assert_eq!(stats.samples, 1);

        assert_eq!(average_cycle_stats(&[]), CycleStats::default());
    }
}
