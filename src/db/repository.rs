use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::models::validation::{format_date, parse_date};
use crate::models::{
    CyclePrediction, Habit, HealthCategory, HealthEntry, JournalEntry, PeriodRecord,
    StoredPrediction, StreakSnapshot,
};

fn date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    parse_date(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(idx)? {
        None => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
    }
}

// ─── Periods ─────────────────────────────────────────────────────────────────

pub struct PeriodRepo;

impl PeriodRepo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<PeriodRecord> {
        Ok(PeriodRecord {
            id: Some(row.get(0)?),
            start_date: date_col(row, 1)?,
            end_date: opt_date_col(row, 2)?,
            cycle_length_days: row.get(3)?,
            notes: row.get(4)?,
        })
    }

    pub fn insert(conn: &Connection, record: &PeriodRecord) -> Result<i64> {
        conn.execute(
            "INSERT INTO periods (start_date, end_date, cycle_length_days, notes)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                format_date(record.start_date),
                record.end_date.map(format_date),
                record.cycle_length_days,
                record.notes,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Latest period strictly before `date`, by start date.
    pub fn latest_before(conn: &Connection, date: NaiveDate) -> Result<Option<PeriodRecord>> {
        conn.query_row(
            "SELECT id, start_date, end_date, cycle_length_days, notes
             FROM periods WHERE start_date < ?1
             ORDER BY start_date DESC LIMIT 1",
            params![format_date(date)],
            Self::from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn latest(conn: &Connection) -> Result<Option<PeriodRecord>> {
        conn.query_row(
            "SELECT id, start_date, end_date, cycle_length_days, notes
             FROM periods ORDER BY start_date DESC LIMIT 1",
            [],
            Self::from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    /// Most recent first. `None` returns the full history.
    pub fn recent(conn: &Connection, limit: Option<u32>) -> Result<Vec<PeriodRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, start_date, end_date, cycle_length_days, notes
             FROM periods ORDER BY start_date DESC LIMIT ?1",
        )?;
        let limit = limit.map(i64::from).unwrap_or(-1);
        let rows = stmt.query_map(params![limit], Self::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn find_by_start(conn: &Connection, start: NaiveDate) -> Result<Option<PeriodRecord>> {
        conn.query_row(
            "SELECT id, start_date, end_date, cycle_length_days, notes
             FROM periods WHERE start_date = ?1",
            params![format_date(start)],
            Self::from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    /// Earliest period strictly after `date`, by start date.
    pub fn earliest_after(conn: &Connection, date: NaiveDate) -> Result<Option<PeriodRecord>> {
        conn.query_row(
            "SELECT id, start_date, end_date, cycle_length_days, notes
             FROM periods WHERE start_date > ?1
             ORDER BY start_date ASC LIMIT 1",
            params![format_date(date)],
            Self::from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set_cycle_length(conn: &Connection, id: i64, days: Option<i64>) -> Result<()> {
        conn.execute(
            "UPDATE periods SET cycle_length_days = ?1 WHERE id = ?2",
            params![days, id],
        )?;
        Ok(())
    }

    pub fn set_end_date(conn: &Connection, id: i64, end: NaiveDate) -> Result<()> {
        conn.execute(
            "UPDATE periods SET end_date = ?1 WHERE id = ?2",
            params![format_date(end), id],
        )?;
        Ok(())
    }
}

// ─── Predictions ─────────────────────────────────────────────────────────────

pub struct PredictionRepo;

impl PredictionRepo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<StoredPrediction> {
        Ok(StoredPrediction {
            id: row.get(0)?,
            prediction: CyclePrediction {
                predicted_period_start: date_col(row, 1)?,
                predicted_period_end: date_col(row, 2)?,
                predicted_ovulation_start: date_col(row, 3)?,
                predicted_ovulation_end: date_col(row, 4)?,
                confidence_score: row.get(5)?,
            },
            created_at: row.get(6)?,
        })
    }

    /// Predictions are history: every call adds a row.
    pub fn append(conn: &Connection, prediction: &CyclePrediction) -> Result<i64> {
        conn.execute(
            "INSERT INTO cycle_predictions
                (predicted_period_start, predicted_period_end,
                 predicted_ovulation_start, predicted_ovulation_end, confidence_score)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                format_date(prediction.predicted_period_start),
                format_date(prediction.predicted_period_end),
                format_date(prediction.predicted_ovulation_start),
                format_date(prediction.predicted_ovulation_end),
                prediction.confidence_score,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn latest(conn: &Connection) -> Result<Option<StoredPrediction>> {
        conn.query_row(
            "SELECT id, predicted_period_start, predicted_period_end,
                    predicted_ovulation_start, predicted_ovulation_end,
                    confidence_score, created_at
             FROM cycle_predictions ORDER BY id DESC LIMIT 1",
            [],
            Self::from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn history(conn: &Connection, limit: u32) -> Result<Vec<StoredPrediction>> {
        let mut stmt = conn.prepare(
            "SELECT id, predicted_period_start, predicted_period_end,
                    predicted_ovulation_start, predicted_ovulation_end,
                    confidence_score, created_at
             FROM cycle_predictions ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], Self::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub struct HabitRepo;

impl HabitRepo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        Ok(Habit {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            active: row.get::<_, i32>(3)? != 0,
            created_at: row.get(4)?,
        })
    }

    pub fn create(conn: &Connection, name: &str, description: Option<&str>) -> Result<i64> {
        conn.execute(
            "INSERT INTO habits (name, description, active) VALUES (?1, ?2, 1)",
            params![name, description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_active(conn: &Connection) -> Result<Vec<Habit>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, description, active, created_at
             FROM habits WHERE active = 1 ORDER BY id",
        )?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// Case-insensitive, archived habits included.
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Habit>> {
        conn.query_row(
            "SELECT id, name, description, active, created_at
             FROM habits WHERE name = ?1 COLLATE NOCASE",
            params![name.trim()],
            Self::from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set_active(conn: &Connection, habit_id: i64, active: bool) -> Result<()> {
        conn.execute(
            "UPDATE habits SET active = ?1 WHERE id = ?2",
            params![active as i32, habit_id],
        )?;
        Ok(())
    }

    /// Returns false when the day was already recorded.
    pub fn add_completion(conn: &Connection, habit_id: i64, date: NaiveDate) -> Result<bool> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO habit_completions (habit_id, date) VALUES (?1, ?2)",
            params![habit_id, format_date(date)],
        )?;
        Ok(inserted > 0)
    }

    /// Returns false when there was nothing to remove.
    pub fn remove_completion(conn: &Connection, habit_id: i64, date: NaiveDate) -> Result<bool> {
        let removed = conn.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1 AND date = ?2",
            params![habit_id, format_date(date)],
        )?;
        Ok(removed > 0)
    }

    pub fn completions(conn: &Connection, habit_id: i64) -> Result<BTreeSet<NaiveDate>> {
        let mut stmt = conn.prepare("SELECT date FROM habit_completions WHERE habit_id = ?1")?;
        let rows = stmt.query_map(params![habit_id], |row| date_col(row, 0))?;
        rows.collect::<rusqlite::Result<BTreeSet<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn is_done_on(conn: &Connection, habit_id: i64, date: NaiveDate) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM habit_completions WHERE habit_id = ?1 AND date = ?2",
                params![habit_id, format_date(date)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Number of distinct completions across all habits per day in the range.
    pub fn daily_counts(
        conn: &Connection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, u32)>> {
        let mut stmt = conn.prepare(
            "SELECT c.date, COUNT(*)
             FROM habit_completions c JOIN habits h ON h.id = c.habit_id
             WHERE h.active = 1 AND c.date >= ?1 AND c.date <= ?2
             GROUP BY c.date ORDER BY c.date",
        )?;
        let rows = stmt.query_map(params![format_date(start), format_date(end)], |row| {
            Ok((date_col(row, 0)?, row.get::<_, u32>(1)?))
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

// ─── Streaks ─────────────────────────────────────────────────────────────────

pub struct StreakRepo;

impl StreakRepo {
    pub fn get(conn: &Connection, habit_id: i64) -> Result<Option<StreakSnapshot>> {
        conn.query_row(
            "SELECT current_streak, longest_streak, last_completion_date
             FROM habit_streaks WHERE habit_id = ?1",
            params![habit_id],
            |row| {
                Ok(StreakSnapshot {
                    current_streak: row.get(0)?,
                    longest_streak: row.get(1)?,
                    last_completion_date: opt_date_col(row, 2)?,
                })
            },
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    /// Store a freshly computed snapshot. The stored longest streak only grows.
    pub fn save(conn: &Connection, habit_id: i64, snapshot: &StreakSnapshot) -> Result<()> {
        conn.execute(
            "INSERT INTO habit_streaks (habit_id, current_streak, longest_streak, last_completion_date, updated_at)
             VALUES (?1, ?2, ?3, ?4, datetime('now'))
             ON CONFLICT(habit_id) DO UPDATE SET
                current_streak = excluded.current_streak,
                longest_streak = MAX(habit_streaks.longest_streak, excluded.longest_streak),
                last_completion_date = excluded.last_completion_date,
                updated_at = excluded.updated_at",
            params![
                habit_id,
                snapshot.current_streak,
                snapshot.longest_streak,
                snapshot.last_completion_date.map(format_date),
            ],
        )?;
        Ok(())
    }
}

// ─── Health timeline ─────────────────────────────────────────────────────────

pub struct TimelineRepo;

impl TimelineRepo {
    pub fn add(conn: &Connection, entry: &HealthEntry) -> Result<i64> {
        conn.execute(
            "INSERT INTO health_entries (date, category, title, details) VALUES (?1, ?2, ?3, ?4)",
            params![
                format_date(entry.date),
                entry.category.as_str(),
                entry.title,
                entry.details,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Newest first, optionally narrowed to one category.
    pub fn list(
        conn: &Connection,
        category: Option<HealthCategory>,
        limit: u32,
    ) -> Result<Vec<HealthEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, date, category, title, details
             FROM health_entries
             WHERE ?1 IS NULL OR category = ?1
             ORDER BY date DESC, id DESC LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![category.map(|c| c.as_str()), limit], |row| {
            let raw_category: String = row.get(2)?;
            let category = HealthCategory::from_str(&raw_category)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
            Ok(HealthEntry {
                id: Some(row.get(0)?),
                date: date_col(row, 1)?,
                category,
                title: row.get(3)?,
                details: row.get(4)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

// ─── Journal ─────────────────────────────────────────────────────────────────

pub struct JournalRepo;

impl JournalRepo {
    pub fn add(conn: &Connection, entry: &JournalEntry) -> Result<i64> {
        conn.execute(
            "INSERT INTO journal_entries (date, mood, body) VALUES (?1, ?2, ?3)",
            params![format_date(entry.date), entry.mood, entry.body],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Newest first.
    pub fn list(conn: &Connection, limit: u32) -> Result<Vec<JournalEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, date, mood, body FROM journal_entries
             ORDER BY date DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(JournalEntry {
                id: Some(row.get(0)?),
                date: date_col(row, 1)?,
                mood: row.get(2)?,
                body: row.get(3)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn count_on(conn: &Connection, date: NaiveDate) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM journal_entries WHERE date = ?1",
            params![format_date(date)],
            |row| row.get(0),
        )
        .map_err(anyhow::Error::from)
    }
}
