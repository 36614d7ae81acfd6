//! Storage-backed operations. Every function takes the connection it works
//! on; nothing here holds state between calls.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::Connection;

use crate::db::repository::{HabitRepo, JournalRepo, PeriodRepo, PredictionRepo, StreakRepo, TimelineRepo};
use crate::models::validation::non_empty;
use crate::models::{
    CycleLength, CycleOverview, CyclePrediction, CycleStats, Habit, HabitSummary, HealthCategory,
    HealthEntry, JournalEntry, PeriodRecord, StreakSnapshot, ValidationError,
};
use crate::tracking::cycle;
use crate::tracking::streak::compute_streaks;

// ─── Cycle ───────────────────────────────────────────────────────────────────

pub fn cycle_overview(conn: &Connection, today: NaiveDate) -> Result<CycleOverview> {
    let Some(last) = PeriodRepo::latest(conn)? else {
        return Ok(CycleOverview::empty());
    };

    let phase = cycle::classify_current_phase(Some(last.start_date), today);
    let next_predicted = PredictionRepo::latest(conn)?.map(|stored| stored.prediction);
    let fertility_window = next_predicted.as_ref().map(cycle::fertility_window);

    Ok(CycleOverview {
        current_phase: phase.phase,
        current_day: phase.day_in_cycle,
        cycle_length: last.cycle_length_days,
        last_period: Some(last.start_date),
        next_predicted,
        fertility_window,
    })
}

#[derive(Debug, Clone)]
pub struct LoggedPeriod {
    pub record: PeriodRecord,
    pub prediction: Option<CyclePrediction>,
}

/// Store a new period and append a fresh prediction from the latest period,
/// when a positive cycle length leads up to it.
pub fn log_period(
    conn: &Connection,
    start: NaiveDate,
    end: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<LoggedPeriod> {
    if let Some(end) = end {
        if end < start {
            return Err(ValidationError::EndBeforeStart { start, end }.into());
        }
    }

    let tx = conn.unchecked_transaction()?;

    if PeriodRepo::find_by_start(&tx, start)?.is_some() {
        return Err(anyhow!("A period starting {} is already logged", start));
    }

    let previous = PeriodRepo::latest_before(&tx, start)?;
    let cycle_length_days = previous
        .as_ref()
        .map(|p| cycle::cycle_length_between(p.start_date, start));

    let mut record = PeriodRecord {
        end_date: end,
        cycle_length_days,
        notes,
        ..PeriodRecord::new(start)
    };
    let id = PeriodRepo::insert(&tx, &record)
        .with_context(|| format!("Saving period starting {}", start))?;
    record.id = Some(id);

    // Predictions always come from the latest period. A backfilled period
    // becomes the predecessor of the one after it instead.
    let prediction = match PeriodRepo::earliest_after(&tx, start)? {
        None => append_prediction(&tx, start, cycle_length_days)?,
        Some(next) => {
            let length = cycle::cycle_length_between(start, next.start_date);
            if let Some(next_id) = next.id {
                PeriodRepo::set_cycle_length(&tx, next_id, Some(length))?;
                debug!("period {} now follows a {}-day cycle", next.start_date, length);
            }
            if PeriodRepo::earliest_after(&tx, next.start_date)?.is_none() {
                append_prediction(&tx, next.start_date, Some(length))?
            } else {
                None
            }
        }
    };

    tx.commit().context("Committing period")?;

    info!(
        "logged period starting {} (cycle length {:?}, prediction {})",
        start,
        cycle_length_days,
        if prediction.is_some() { "added" } else { "skipped" }
    );

    Ok(LoggedPeriod { record, prediction })
}

/// Predict from `start` when the cycle length before it is usable.
fn append_prediction(
    conn: &Connection,
    start: NaiveDate,
    cycle_length_days: Option<i64>,
) -> Result<Option<CyclePrediction>> {
    match cycle_length_days.map(CycleLength::new) {
        Some(Ok(length)) => {
            let prediction = cycle::predict(start, length);
            PredictionRepo::append(conn, &prediction)?;
            Ok(Some(prediction))
        }
        Some(Err(e)) => {
            debug!("no prediction for period {}: {}", start, e);
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Record the end date of the most recent period.
pub fn end_latest_period(conn: &Connection, end: NaiveDate) -> Result<PeriodRecord> {
    let mut latest = PeriodRepo::latest(conn)?
        .ok_or_else(|| anyhow!("No period logged yet. Use `bloom period log <date>` first"))?;
    let id = latest
        .id
        .ok_or_else(|| anyhow!("Stored period has no id"))?;

    if end < latest.start_date {
        return Err(ValidationError::EndBeforeStart {
            start: latest.start_date,
            end,
        }
        .into());
    }

    PeriodRepo::set_end_date(conn, id, end)?;
    latest.end_date = Some(end);
    info!("period starting {} ended {}", latest.start_date, end);
    Ok(latest)
}

pub fn cycle_stats(conn: &Connection) -> Result<CycleStats> {
    let history = PeriodRepo::recent(conn, None)?;
    let stats = cycle::average_cycle_stats(&history);
    debug!("cycle stats over {} periods: {:?}", history.len(), stats);
    Ok(stats)
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub fn add_habit(conn: &Connection, name: &str, description: Option<&str>) -> Result<Habit> {
    let name = non_empty("habit name", name)?;
    if HabitRepo::find_by_name(conn, name)?.is_some() {
        return Err(anyhow!("Habit '{}' already exists", name));
    }
    HabitRepo::create(conn, name, description)?;
    info!("created habit '{}'", name);
    find_habit(conn, name)
}

/// Look a habit up by name, archived ones included.
pub fn find_habit(conn: &Connection, name: &str) -> Result<Habit> {
    HabitRepo::find_by_name(conn, name)?.ok_or_else(|| anyhow!("Habit '{}' not found", name))
}

pub fn archive_habit(conn: &Connection, name: &str) -> Result<Habit> {
    let mut habit = find_habit(conn, name)?;
    HabitRepo::set_active(conn, habit.id, false)?;
    habit.active = false;
    info!("archived habit '{}'", habit.name);
    Ok(habit)
}

/// Mark or unmark `date` for a habit, then recompute and store its streak.
///
/// The returned snapshot is the stored one, so its longest streak is the best
/// ever seen rather than the best in the current completion set.
pub fn set_completion(
    conn: &Connection,
    habit: &Habit,
    date: NaiveDate,
    done: bool,
    today: NaiveDate,
) -> Result<StreakSnapshot> {
    let tx = conn.unchecked_transaction()?;

    let changed = if done {
        HabitRepo::add_completion(&tx, habit.id, date)?
    } else {
        HabitRepo::remove_completion(&tx, habit.id, date)?
    };

    let completions = HabitRepo::completions(&tx, habit.id)?;
    let computed = compute_streaks(&completions, today);
    StreakRepo::save(&tx, habit.id, &computed)?;
    let stored = StreakRepo::get(&tx, habit.id)?.unwrap_or(computed);

    tx.commit().context("Committing habit completion")?;

    if changed {
        info!(
            "habit '{}' {} for {}",
            habit.name,
            if done { "completed" } else { "uncompleted" },
            date
        );
    }
    debug!("habit '{}' streak now {:?}", habit.name, stored);

    Ok(stored)
}

/// Flip today's completion for a habit.
pub fn toggle_today(conn: &Connection, habit: &Habit, today: NaiveDate) -> Result<StreakSnapshot> {
    let done = HabitRepo::is_done_on(conn, habit.id, today)?;
    set_completion(conn, habit, today, !done, today)
}

/// Streak for display. The current streak is recomputed for `today` so a
/// missed day shows as broken even before the next write.
pub fn streak_for(conn: &Connection, habit_id: i64, today: NaiveDate) -> Result<StreakSnapshot> {
    let completions = HabitRepo::completions(conn, habit_id)?;
    let mut snapshot = compute_streaks(&completions, today);
    if let Some(stored) = StreakRepo::get(conn, habit_id)? {
        snapshot.longest_streak = snapshot.longest_streak.max(stored.longest_streak);
    }
    Ok(snapshot)
}

pub fn habit_summaries(conn: &Connection, today: NaiveDate) -> Result<Vec<HabitSummary>> {
    HabitRepo::get_active(conn)?
        .into_iter()
        .map(|habit| -> Result<HabitSummary> {
            let streak = streak_for(conn, habit.id, today)?;
            let done_today = HabitRepo::is_done_on(conn, habit.id, today)?;
            Ok(HabitSummary {
                habit,
                streak,
                done_today,
            })
        })
        .collect()
}

// ─── Timeline & journal ──────────────────────────────────────────────────────

pub fn add_health_entry(
    conn: &Connection,
    date: NaiveDate,
    category: HealthCategory,
    title: &str,
    details: Option<String>,
) -> Result<HealthEntry> {
    let mut entry = HealthEntry {
        id: None,
        date,
        category,
        title: non_empty("title", title)?.to_string(),
        details: details.filter(|d| !d.trim().is_empty()),
    };
    entry.id = Some(TimelineRepo::add(conn, &entry)?);
    info!("timeline: {} '{}' on {}", category.as_str(), entry.title, date);
    Ok(entry)
}

pub fn write_journal(
    conn: &Connection,
    date: NaiveDate,
    mood: Option<u8>,
    body: &str,
) -> Result<JournalEntry> {
    let mut entry = JournalEntry {
        id: None,
        date,
        mood: JournalEntry::check_mood(mood)?,
        body: non_empty("journal entry", body)?.to_string(),
    };
    entry.id = Some(JournalRepo::add(conn, &entry)?);
    info!("journal entry written for {}", date);
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::CyclePhase;
    use chrono::Duration;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn overview_without_history_is_unknown() {
        let conn = conn();
        let overview = cycle_overview(&conn, date("2024-06-01")).unwrap();
        assert_eq!(overview, CycleOverview::empty());
    }

    #[test]
    fn first_period_has_no_prediction() {
        let conn = conn();
        let logged = log_period(&conn, date("2024-01-01"), None, None).unwrap();
        assert_eq!(logged.record.cycle_length_days, None);
        assert!(logged.prediction.is_none());
        assert!(PredictionRepo::latest(&conn).unwrap().is_none());

        let overview = cycle_overview(&conn, date("2024-01-03")).unwrap();
        assert_eq!(overview.current_phase, CyclePhase::Menstrual);
        assert_eq!(overview.current_day, 3);
        assert_eq!(overview.next_predicted, None);
    }

    #[test]
    fn second_period_derives_length_and_predicts() {
        let conn = conn();
        log_period(&conn, date("2024-01-01"), Some(date("2024-01-05")), None).unwrap();
        let logged = log_period(&conn, date("2024-01-31"), None, Some("light".into())).unwrap();

        assert_eq!(logged.record.cycle_length_days, Some(30));
        let prediction = logged.prediction.unwrap();
        assert_eq!(prediction.predicted_period_start, date("2024-03-01"));
        assert_eq!(prediction.predicted_ovulation_start, date("2024-02-16"));

        let overview = cycle_overview(&conn, date("2024-02-15")).unwrap();
        assert_eq!(overview.current_phase, CyclePhase::Ovulation);
        assert_eq!(overview.current_day, 16);
        assert_eq!(overview.cycle_length, Some(30));
        assert_eq!(overview.last_period, Some(date("2024-01-31")));
        assert_eq!(overview.next_predicted, Some(prediction));
        assert_eq!(overview.fertility_window.unwrap().start, date("2024-02-11"));
        assert_eq!(overview.days_until_next_period(date("2024-02-15")), Some(15));
    }

    #[test]
    fn predictions_accumulate() {
        let conn = conn();
        log_period(&conn, date("2024-01-01"), None, None).unwrap();
        log_period(&conn, date("2024-01-29"), None, None).unwrap();
        log_period(&conn, date("2024-02-27"), None, None).unwrap();

        let history = PredictionRepo::history(&conn, 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].prediction.predicted_period_start, date("2024-03-27"));
        assert_eq!(history[1].prediction.predicted_period_start, date("2024-02-26"));
    }

    #[test]
    fn backfilled_period_updates_its_successor() {
        let conn = conn();
        log_period(&conn, date("2024-01-01"), None, None).unwrap();
        log_period(&conn, date("2024-02-26"), None, None).unwrap();
        log_period(&conn, date("2024-01-29"), None, None).unwrap();

        let history = PeriodRepo::recent(&conn, None).unwrap();
        let lengths: Vec<Option<i64>> = history.iter().map(|p| p.cycle_length_days).collect();
        assert_eq!(lengths, vec![Some(28), Some(28), None]);

        let stats = cycle_stats(&conn).unwrap();
        assert_eq!(stats.samples, 2);
        assert_eq!(stats.mean_length_days, Some(28.0));
        assert_eq!(stats.std_dev_days, Some(0.0));

        let overview = cycle_overview(&conn, date("2024-03-01")).unwrap();
        assert_eq!(overview.last_period, Some(date("2024-02-26")));
        let next = overview.next_predicted.unwrap();
        assert_eq!(next.predicted_period_start, date("2024-03-25"));
    }

    #[test]
    fn backfill_behind_two_later_periods_adds_no_prediction() {
        let conn = conn();
        log_period(&conn, date("2024-01-01"), None, None).unwrap();
        log_period(&conn, date("2024-02-26"), None, None).unwrap();
        log_period(&conn, date("2024-03-25"), None, None).unwrap();
        let before = PredictionRepo::history(&conn, 100).unwrap().len();

        let logged = log_period(&conn, date("2024-01-29"), None, None).unwrap();
        assert!(logged.prediction.is_none());
        assert_eq!(PredictionRepo::history(&conn, 100).unwrap().len(), before);

        let overview = cycle_overview(&conn, date("2024-04-01")).unwrap();
        let next = overview.next_predicted.unwrap();
        assert_eq!(next.predicted_period_start, date("2024-04-22"));
    }

    #[test]
    fn duplicate_start_is_rejected_clearly() {
        let conn = conn();
        log_period(&conn, date("2024-01-01"), None, None).unwrap();
        let err = log_period(&conn, date("2024-01-01"), None, None).unwrap_err();
        assert_eq!(err.to_string(), "A period starting 2024-01-01 is already logged");
        assert_eq!(PeriodRepo::recent(&conn, None).unwrap().len(), 1);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let conn = conn();
        let err = log_period(&conn, date("2024-01-05"), Some(date("2024-01-01")), None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::EndBeforeStart { .. })
        ));
        assert!(PeriodRepo::latest(&conn).unwrap().is_none());

        log_period(&conn, date("2024-01-05"), None, None).unwrap();
        assert!(end_latest_period(&conn, date("2024-01-04")).is_err());
        let ended = end_latest_period(&conn, date("2024-01-09")).unwrap();
        assert_eq!(ended.period_length_days(), Some(5));
    }

    #[test]
    fn end_without_any_period_fails() {
        let conn = conn();
        assert!(end_latest_period(&conn, date("2024-01-04")).is_err());
    }

    #[test]
    fn completion_round_trip_keeps_longest() {
        let conn = conn();
        let habit = add_habit(&conn, "Meditate", Some("10 minutes")).unwrap();
        let today = date("2024-06-15");

        for offset in (0..4).rev() {
            set_completion(&conn, &habit, today - Duration::days(offset), true, today).unwrap();
        }
        let snapshot = streak_for(&conn, habit.id, today).unwrap();
        assert_eq!(snapshot.current_streak, 4);
        assert_eq!(snapshot.longest_streak, 4);

        // Punch a hole in the middle: the run splits but the record stands.
        let snapshot = set_completion(&conn, &habit, today - Duration::days(2), false, today).unwrap();
        assert_eq!(snapshot.current_streak, 2);
        assert_eq!(snapshot.longest_streak, 4);
        assert_eq!(snapshot.last_completion_date, Some(today));
    }

    #[test]
    fn toggle_flips_today() {
        let conn = conn();
        let habit = add_habit(&conn, "Read", None).unwrap();
        let today = date("2024-06-15");

        assert_eq!(toggle_today(&conn, &habit, today).unwrap().current_streak, 1);
        assert!(HabitRepo::is_done_on(&conn, habit.id, today).unwrap());
        assert_eq!(toggle_today(&conn, &habit, today).unwrap().current_streak, 0);
        assert!(!HabitRepo::is_done_on(&conn, habit.id, today).unwrap());
    }

    #[test]
    fn displayed_streak_decays_after_a_missed_day() {
        let conn = conn();
        let habit = add_habit(&conn, "Walk", None).unwrap();
        let day = date("2024-06-10");
        set_completion(&conn, &habit, day, true, day).unwrap();

        let summaries = habit_summaries(&conn, day + Duration::days(3)).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].streak.current_streak, 0);
        assert_eq!(summaries[0].streak.longest_streak, 1);
        assert!(!summaries[0].done_today);
    }

    #[test]
    fn habit_lookups() {
        let conn = conn();
        add_habit(&conn, "Yoga", None).unwrap();
        assert!(add_habit(&conn, "yoga", None).is_err());
        assert!(add_habit(&conn, "   ", None).is_err());
        assert!(find_habit(&conn, "pilates").is_err());

        let archived = archive_habit(&conn, "YOGA").unwrap();
        assert!(!archived.active);
        assert!(habit_summaries(&conn, date("2024-06-01")).unwrap().is_empty());
    }

    #[test]
    fn timeline_and_journal_validate_input() {
        let conn = conn();
        let day = date("2024-06-01");

        let entry = add_health_entry(&conn, day, HealthCategory::Symptom, " Migraine ", Some(" ".into()))
            .unwrap();
        assert_eq!(entry.title, "Migraine");
        assert_eq!(entry.details, None);
        assert!(add_health_entry(&conn, day, HealthCategory::Note, "", None).is_err());

        let journal = write_journal(&conn, day, Some(5), "Good day").unwrap();
        assert!(journal.id.is_some());
        assert!(write_journal(&conn, day, Some(9), "Too good").is_err());
        assert!(write_journal(&conn, day, None, "  ").is_err());
    }
}
