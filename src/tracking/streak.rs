use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use std::collections::BTreeSet;

use crate::models::StreakSnapshot;

/// Drop the time of day, keeping the calendar day in the timestamp's own zone.
pub fn to_calendar_day<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> NaiveDate {
    timestamp.date_naive()
}

/// Current and longest run of consecutive completion days.
///
/// The current streak is alive only while the latest completion is today or
/// yesterday. The longest streak is at least the current one.
pub fn compute_streaks(completions: &BTreeSet<NaiveDate>, today: NaiveDate) -> StreakSnapshot {
    // Most recent first
    let dates: Vec<NaiveDate> = completions.iter().rev().copied().collect();

    let Some(&latest) = dates.first() else {
        return StreakSnapshot::default();
    };

    let yesterday = today - Duration::days(1);
    let mut current = 0u32;
    if latest == today || latest == yesterday {
        current = 1;
        for pair in dates.windows(2) {
            if (pair[0] - pair[1]).num_days() == 1 {
                current += 1;
            } else {
                break;
            }
        }
    }

    let mut longest = 1u32;
    let mut running = 1u32;
    for pair in dates.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            running += 1;
        } else {
            running = 1;
        }
        longest = longest.max(running);
    }

    StreakSnapshot {
        current_streak: current,
        longest_streak: longest.max(current),
        last_completion_date: Some(latest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn days_ago(offsets: &[i64]) -> BTreeSet<NaiveDate> {
        offsets
            .iter()
            .map(|d| today() - Duration::days(*d))
            .collect()
    }

    #[test]
    fn empty_set_has_no_streak() {
        let snapshot = compute_streaks(&BTreeSet::new(), today());
        assert_eq!(snapshot, StreakSnapshot::default());
        assert_eq!(snapshot.last_completion_date, None);
    }

    #[test]
    fn three_days_running() {
        let snapshot = compute_streaks(&days_ago(&[0, 1, 2]), today());
        assert_eq!(snapshot.current_streak, 3);
        assert_eq!(snapshot.longest_streak, 3);
        assert_eq!(snapshot.last_completion_date, Some(today()));
    }

    #[test]
    fn older_run_ties_but_does_not_exceed() {
        let snapshot = compute_streaks(&days_ago(&[5, 4, 1, 0]), today());
        assert_eq!(snapshot.current_streak, 2);
        assert_eq!(snapshot.longest_streak, 2);
    }

    #[test]
    fn stale_completion_breaks_current_streak() {
        let snapshot = compute_streaks(&days_ago(&[3]), today());
        assert_eq!(snapshot.current_streak, 0);
        assert_eq!(snapshot.longest_streak, 1);
        assert_eq!(snapshot.last_completion_date, Some(today() - Duration::days(3)));
    }

    #[test]
    fn single_completion_today_or_yesterday() {
        assert_eq!(compute_streaks(&days_ago(&[0]), today()).current_streak, 1);
        assert_eq!(compute_streaks(&days_ago(&[1]), today()).current_streak, 1);
    }

    #[test]
    fn streak_alive_through_yesterday() {
        let snapshot = compute_streaks(&days_ago(&[1, 2, 3, 4]), today());
        assert_eq!(snapshot.current_streak, 4);
        assert_eq!(snapshot.longest_streak, 4);
    }

    #[test]
    fn historical_run_counts_only_for_longest() {
        let snapshot = compute_streaks(&days_ago(&[0, 10, 11, 12, 13, 14]), today());
        assert_eq!(snapshot.current_streak, 1);
        assert_eq!(snapshot.longest_streak, 5);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let set = days_ago(&[0, 1, 3, 4, 5, 9]);
        let first = compute_streaks(&set, today());
        let second = compute_streaks(&set, today());
        assert_eq!(first, second);
    }

    #[test]
    fn longest_never_below_current() {
        // Every subset of the last 12 days.
        for mask in 0u32..(1 << 12) {
            let offsets: Vec<i64> = (0..12).filter(|bit| mask & (1 << bit) != 0).collect();
            let snapshot = compute_streaks(&days_ago(&offsets), today());
            assert!(
                snapshot.longest_streak >= snapshot.current_streak,
                "mask {:b}: {:?}",
                mask,
                snapshot
            );
        }
    }

    #[test]
    fn timestamps_on_the_same_day_collapse() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let morning = tz.with_ymd_and_hms(2024, 6, 15, 7, 30, 0).unwrap();
        let night = tz.with_ymd_and_hms(2024, 6, 15, 23, 59, 0).unwrap();

        let set: BTreeSet<NaiveDate> = [morning, night].iter().map(to_calendar_day).collect();
        assert_eq!(set.len(), 1);
        assert_eq!(compute_streaks(&set, today()).current_streak, 1);

        let utc = Utc.with_ymd_and_hms(2024, 6, 14, 23, 0, 0).unwrap();
        assert_eq!(to_calendar_day(&utc.with_timezone(&tz)), today());
    }
}
