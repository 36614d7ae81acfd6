use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::cli::args::{
    ConfigCommands, CycleCommands, HabitCommands, JournalCommands, PeriodCommands,
    TimelineCommands,
};
use crate::config::AppConfig;
use crate::db::repository::{HabitRepo, JournalRepo, PeriodRepo, PredictionRepo, TimelineRepo};
use crate::models::validation::parse_date;
use crate::models::{
    CycleOverview, CyclePhase, Habit, HealthCategory, HealthEntry, JournalEntry, PeriodRecord,
    StoredPrediction, StreakSnapshot,
};
use crate::tracking::service;
use crate::utils::format::{
    fit_width, format_day, format_days, format_opt_days, format_relative, mood_dots, progress_bar,
};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const ROSE: &str = "\x1b[38;2;214;112;138m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";

fn phase_color(phase: CyclePhase) -> &'static str {
    match phase {
        CyclePhase::Menstrual => ROSE,
        CyclePhase::Follicular => GREEN,
        CyclePhase::Ovulation => AMBER,
        CyclePhase::Luteal => BOLD,
        CyclePhase::Unknown => DIM,
    }
}

/// Optional `YYYY-MM-DD` argument, defaulting to `today`.
fn day_arg(arg: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match arg {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(today),
    }
}

// ─── Period ──────────────────────────────────────────────────────────────────

pub fn handle_period(conn: &Connection, action: &PeriodCommands, today: NaiveDate) -> Result<()> {
    match action {
        PeriodCommands::Log { start, end, note } => {
            let start = day_arg(start.as_deref(), today)?;
            let end = end.as_deref().map(parse_date).transpose()?;
            let logged = service::log_period(conn, start, end, note.clone())?;

            println_colored!(ROSE, "  ✓ Period logged starting {}", format_day(start));
            if let Some(length) = logged.record.cycle_length_days {
                println_colored!(DIM, "    Cycle length since previous: {}", format_days(length));
            }
            match &logged.prediction {
                Some(p) => println_colored!(
                    AMBER,
                    "    Next period expected {} ({})",
                    format_day(p.predicted_period_start),
                    format_relative(p.predicted_period_start, today)
                ),
                None => println_colored!(
                    DIM,
                    "    Log another period to start getting predictions"
                ),
            }
        }
        PeriodCommands::End { date } => {
            let end = day_arg(date.as_deref(), today)?;
            let record = service::end_latest_period(conn, end)?;
            let length = record.period_length_days().unwrap_or(0);
            println_colored!(
                GREEN,
                "  ✓ Period starting {} ended {} ({})",
                format_day(record.start_date),
                format_day(end),
                format_days(length)
            );
        }
        PeriodCommands::List { limit } => {
            let periods = PeriodRepo::recent(conn, Some(*limit))?;
            println!();
            if periods.is_empty() {
                println_colored!(DIM, "  No periods logged yet");
            } else {
                println_colored!(ROSE, "  Periods");
                println!();
                for p in &periods {
                    print_period_row(p);
                }
            }
            println!();
        }
    }
    Ok(())
}

fn print_period_row(p: &PeriodRecord) {
    let end = p
        .end_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "ongoing".to_string());
    let cycle = p
        .cycle_length_days
        .map(format_days)
        .unwrap_or_else(|| "–".to_string());
    let note = p.notes.as_deref().unwrap_or("");
    println!("  {}  →  {:<10}  cycle {:<8}  {}", p.start_date, end, cycle, note);
}

// ─── Cycle ───────────────────────────────────────────────────────────────────

pub fn handle_cycle(
    conn: &Connection,
    config: &AppConfig,
    action: Option<&CycleCommands>,
    today: NaiveDate,
) -> Result<()> {
    match action {
        None => {
            let overview = service::cycle_overview(conn, today)?;
            print_overview(&overview, config, today);
        }
        Some(CycleCommands::Stats) => {
            let stats = service::cycle_stats(conn)?;
            println!();
            println_colored!(ROSE, "  Cycle statistics");
            println!();
            println!("  Cycles measured:  {}", stats.samples);
            println!("  Mean length:      {} days", format_opt_days(stats.mean_length_days));
            println!("  Std deviation:    {} days", format_opt_days(stats.std_dev_days));
            if stats.mean_length_days.is_none() {
                println!();
                println_colored!(DIM, "  At least two measured cycles are needed");
            }
            println!();
        }
        Some(CycleCommands::History { limit }) => {
            let history = PredictionRepo::history(conn, *limit)?;
            println!();
            if history.is_empty() {
                println_colored!(DIM, "  No predictions yet");
            } else {
                println_colored!(ROSE, "  Prediction history");
                println!();
                for stored in &history {
                    print_prediction_row(stored);
                }
            }
            println!();
        }
    }
    Ok(())
}

fn print_prediction_row(stored: &StoredPrediction) {
    let p = &stored.prediction;
    println!(
        "  {}  period {} – {}  ovulation {} – {}  ({:.0}%)",
        stored.created_at,
        p.predicted_period_start,
        p.predicted_period_end,
        p.predicted_ovulation_start,
        p.predicted_ovulation_end,
        p.confidence_score * 100.0
    );
}

fn print_overview(overview: &CycleOverview, config: &AppConfig, today: NaiveDate) {
    println!();
    let Some(last) = overview.last_period else {
        println_colored!(DIM, "  No period logged yet. Try `bloom period log YYYY-MM-DD`");
        println!();
        return;
    };

    println_colored!(
        phase_color(overview.current_phase),
        "  {} phase  ·  day {}",
        overview.current_phase,
        overview.current_day
    );
    println!();
    println!("  Last period:   {} ({})", format_day(last), format_relative(last, today));
    if let Some(length) = overview.cycle_length {
        println!("  Cycle length:  {}", format_days(length));
    }

    match &overview.next_predicted {
        Some(p) => {
            println_colored!(
                AMBER,
                "  Next period:   {} ({})",
                format_day(p.predicted_period_start),
                format_relative(p.predicted_period_start, today)
            );
            println!(
                "  Ovulation:     {} – {}",
                format_day(p.predicted_ovulation_start),
                format_day(p.predicted_ovulation_end)
            );
            if config.cycle.show_fertility_window {
                if let Some(window) = overview.fertility_window {
                    let marker = if window.contains(today) { "  ← now" } else { "" };
                    println!(
                        "  Fertile:       {} – {}{}",
                        format_day(window.start),
                        format_day(window.end),
                        marker
                    );
                }
            }
            println_colored!(DIM, "  Confidence:    {:.0}%", p.confidence_score * 100.0);
        }
        None => println_colored!(DIM, "  Next period:   log one more period for a prediction"),
    }
    println!();
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub fn handle_habit(conn: &Connection, action: &HabitCommands, today: NaiveDate) -> Result<()> {
    match action {
        HabitCommands::Add { name, description } => {
            let habit = service::add_habit(conn, name, description.as_deref())?;
            println_colored!(GREEN, "  ✓ Added habit: {}", habit.name);
        }
        HabitCommands::List => {
            let summaries = service::habit_summaries(conn, today)?;
            println!();
            if summaries.is_empty() {
                println_colored!(DIM, "  No habits yet. Try `bloom habit add \"Drink water\"`");
            } else {
                println_colored!(GREEN, "  Habits");
                println!();
                for s in &summaries {
                    let mark = if s.done_today {
                        format!("{}●\x1b[0m", GREEN)
                    } else {
                        "○".to_string()
                    };
                    println!(
                        "  {} {}  {:>3} current  {:>3} best",
                        mark,
                        fit_width(&s.habit.name, 28),
                        s.streak.current_streak,
                        s.streak.longest_streak
                    );
                }
            }
            println!();
        }
        HabitCommands::Done { name, date } => {
            let habit = service::find_habit(conn, name)?;
            let day = day_arg(date.as_deref(), today)?;
            let streak = service::set_completion(conn, &habit, day, true, today)?;
            println_colored!(GREEN, "  ✓ {} done for {}", habit.name, format_day(day));
            print_streak_line(&streak);
        }
        HabitCommands::Undo { name, date } => {
            let habit = service::find_habit(conn, name)?;
            let day = day_arg(date.as_deref(), today)?;
            let streak = service::set_completion(conn, &habit, day, false, today)?;
            println_colored!(DIM, "  ○ {} unmarked for {}", habit.name, format_day(day));
            print_streak_line(&streak);
        }
        HabitCommands::Archive { name } => {
            let habit = service::archive_habit(conn, name)?;
            println_colored!(DIM, "  Archived {} (history kept)", habit.name);
        }
    }
    Ok(())
}

fn print_streak_line(streak: &StreakSnapshot) {
    println_colored!(
        BOLD,
        "    Streak: {} current  |  {} best",
        format_days(streak.current_streak as i64),
        format_days(streak.longest_streak as i64)
    );
}

// ─── Timeline ────────────────────────────────────────────────────────────────

pub fn handle_timeline(conn: &Connection, action: &TimelineCommands, today: NaiveDate) -> Result<()> {
    match action {
        TimelineCommands::Add {
            category,
            title,
            details,
            date,
        } => {
            let category = HealthCategory::from_str(category)?;
            let day = day_arg(date.as_deref(), today)?;
            let entry = service::add_health_entry(conn, day, category, title, details.clone())?;
            println_colored!(GREEN, "  ✓ {} added: {}", entry.category, entry.title);
        }
        TimelineCommands::List { category, limit } => {
            let category = category
                .as_deref()
                .map(HealthCategory::from_str)
                .transpose()?;
            let entries = TimelineRepo::list(conn, category, *limit)?;
            println!();
            if entries.is_empty() {
                println_colored!(DIM, "  Timeline is empty");
                let names: Vec<&str> = HealthCategory::all().iter().map(|c| c.as_str()).collect();
                println_colored!(DIM, "  Categories: {}", names.join(", "));
            } else {
                println_colored!(ROSE, "  Health timeline");
                println!();
                for e in &entries {
                    print_timeline_row(e);
                }
            }
            println!();
        }
    }
    Ok(())
}

fn print_timeline_row(e: &HealthEntry) {
    println!("  {}  {:<12} {}", e.date, e.category.display_name(), e.title);
    if let Some(details) = &e.details {
        println_colored!(DIM, "              {}", details);
    }
}

// ─── Journal ─────────────────────────────────────────────────────────────────

pub fn handle_journal(
    conn: &Connection,
    config: &AppConfig,
    action: &JournalCommands,
    today: NaiveDate,
) -> Result<()> {
    match action {
        JournalCommands::Write { body, mood, date } => {
            let day = day_arg(date.as_deref(), today)?;
            let entry = service::write_journal(conn, day, *mood, body)?;
            println_colored!(GREEN, "  ✓ Journal entry saved for {}", format_day(entry.date));
        }
        JournalCommands::List { limit } => {
            let limit = limit.unwrap_or(config.journal.default_list_limit);
            let entries = JournalRepo::list(conn, limit)?;
            println!();
            if entries.is_empty() {
                println_colored!(DIM, "  No journal entries yet");
            } else {
                for e in &entries {
                    print_journal_entry(e);
                }
            }
        }
    }
    Ok(())
}

fn print_journal_entry(e: &JournalEntry) {
    println_colored!(AMBER, "  {}  {}", format_day(e.date), mood_dots(e.mood));
    for line in e.body.lines() {
        println!("    {}", line);
    }
    println!();
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, config: &AppConfig, today: NaiveDate) -> Result<()> {
    println!();
    if config.cycle.enabled {
        let overview = service::cycle_overview(conn, today)?;
        let stats = service::cycle_stats(conn)?;
        println_colored!(ROSE, "  Cycle");
        println!(
            "  Phase:        {} (day {})",
            overview.current_phase, overview.current_day
        );
        println!(
            "  Mean cycle:   {} ± {} days over {} cycles",
            format_opt_days(stats.mean_length_days),
            format_opt_days(stats.std_dev_days),
            stats.samples
        );
        println!();
    }

    let summaries = service::habit_summaries(conn, today)?;
    println_colored!(GREEN, "  Habits");
    if summaries.is_empty() {
        println_colored!(DIM, "  No habits tracked");
    }
    for s in &summaries {
        println!(
            "  {}  {}  {} current  |  {} best",
            fit_width(&s.habit.name, 24),
            progress_bar(s.streak.current_streak, 30, 12),
            s.streak.current_streak,
            s.streak.longest_streak
        );
    }

    let days = config.habits.grid_days();
    let start = today - Duration::days(days - 1);
    let counts = HabitRepo::daily_counts(conn, start, today)?;
    if !summaries.is_empty() {
        println!();
        println_colored!(DIM, "  Last {} days  (● = all habits, ◑ = some, ○ = none)", days);
        print!("  ");
        for offset in 0..days {
            let day = start + Duration::days(offset);
            let done = counts
                .iter()
                .find(|(d, _)| *d == day)
                .map(|(_, n)| *n as usize)
                .unwrap_or(0);
            let icon = if done >= summaries.len() {
                format!("{}●\x1b[0m ", GREEN)
            } else if done > 0 {
                format!("{}◑\x1b[0m ", AMBER)
            } else {
                format!("{}○\x1b[0m ", DIM)
            };
            print!("{}", icon);
        }
        println!();
    }

    if config.journal.enabled {
        let written_today = JournalRepo::count_on(conn, today)?;
        println!();
        println!("  Journal today: {} entries", written_today);
    }
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HabitExport {
    habit: Habit,
    streak: StreakSnapshot,
    completions: BTreeSet<NaiveDate>,
}

#[derive(Serialize)]
struct ExportDump {
    generated_on: NaiveDate,
    cycle: CycleOverview,
    periods: Vec<PeriodRecord>,
    predictions: Vec<StoredPrediction>,
    habits: Vec<HabitExport>,
    timeline: Vec<HealthEntry>,
    journal: Vec<JournalEntry>,
}

pub fn handle_export(conn: &Connection, json: bool, today: NaiveDate) -> Result<()> {
    if json {
        let mut habits = Vec::new();
        for habit in HabitRepo::get_active(conn)? {
            habits.push(HabitExport {
                streak: service::streak_for(conn, habit.id, today)?,
                completions: HabitRepo::completions(conn, habit.id)?,
                habit,
            });
        }

        let dump = ExportDump {
            generated_on: today,
            cycle: service::cycle_overview(conn, today)?,
            periods: PeriodRepo::recent(conn, None)?,
            predictions: PredictionRepo::history(conn, u32::MAX)?,
            habits,
            timeline: TimelineRepo::list(conn, None, u32::MAX)?,
            journal: JournalRepo::list(conn, u32::MAX)?,
        };
        let out = serde_json::to_string_pretty(&dump).context("Serializing export")?;
        println!("{}", out);
        return Ok(());
    }

    let overview = service::cycle_overview(conn, today)?;
    let summaries = service::habit_summaries(conn, today)?;
    let week_start = today - Duration::days(6);
    let timeline = TimelineRepo::list(conn, None, 50)?;

    println!("# bloom: weekly summary");
    println!("# {}", today);
    println!();
    println!("## Cycle");
    match overview.last_period {
        Some(last) => {
            println!("  Phase:       {} (day {})", overview.current_phase, overview.current_day);
            println!("  Last period: {}", last);
            if let Some(p) = &overview.next_predicted {
                println!("  Next period: {}", p.predicted_period_start);
            }
        }
        None => println!("  No periods logged"),
    }
    println!();
    println!("## Habits");
    for s in &summaries {
        println!(
            "  {}  {} current  (best: {})",
            fit_width(&s.habit.name, 24),
            s.streak.current_streak,
            s.streak.longest_streak
        );
    }
    println!();
    println!("## Timeline (last 7 days)");
    for e in timeline.iter().filter(|e| e.date >= week_start && e.date <= today) {
        println!("  {}  {:<12} {}", e.date, e.category.display_name(), e.title);
    }
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, action: &ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let path = AppConfig::config_path()?;
            println_colored!(DIM, "# {}", path.display());
            let content = toml::to_string_pretty(config).context("Serializing config")?;
            println!("{}", content);
        }
        ConfigCommands::Init => {
            let path = config.save()?;
            println_colored!(GREEN, "  ✓ Wrote {}", path.display());
        }
    }
    Ok(())
}
