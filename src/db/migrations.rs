use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS periods (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            start_date         TEXT NOT NULL UNIQUE,
            end_date           TEXT,
            cycle_length_days  INTEGER,
            notes              TEXT,
            created_at         TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS cycle_predictions (
            id                         INTEGER PRIMARY KEY AUTOINCREMENT,
            predicted_period_start     TEXT NOT NULL,
            predicted_period_end       TEXT NOT NULL,
            predicted_ovulation_start  TEXT NOT NULL,
            predicted_ovulation_end    TEXT NOT NULL,
            confidence_score           REAL NOT NULL,
            created_at                 TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS habits (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            name         TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description  TEXT,
            active       INTEGER DEFAULT 1,
            created_at   TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS habit_completions (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id  INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            date      TEXT NOT NULL,
            UNIQUE(habit_id, date)
        );

        CREATE TABLE IF NOT EXISTS habit_streaks (
            habit_id              INTEGER PRIMARY KEY REFERENCES habits(id) ON DELETE CASCADE,
            current_streak        INTEGER NOT NULL DEFAULT 0,
            longest_streak        INTEGER NOT NULL DEFAULT 0,
            last_completion_date  TEXT,
            updated_at            TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS health_entries (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            category  TEXT NOT NULL
                      CHECK(category IN ('symptom','medication','appointment','measurement','note')),
            title     TEXT NOT NULL,
            details   TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS journal_entries (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            date       TEXT NOT NULL,
            mood       INTEGER CHECK(mood IS NULL OR mood BETWEEN 1 AND 5),
            body       TEXT NOT NULL,
            created_at TEXT DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_health_entries_date ON health_entries(date);
        CREATE INDEX IF NOT EXISTS idx_journal_entries_date ON journal_entries(date);
    ")?;

    Ok(())
}
