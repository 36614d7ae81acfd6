use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::{HabitRepo, JournalRepo, TimelineRepo};
use crate::models::{CycleOverview, CycleStats, HabitSummary, HealthEntry, JournalEntry};
use crate::tracking::service;
use crate::tracking::streak::to_calendar_day;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{cycle, habits, header, journal, statusbar, streak};
use crate::utils::format::{fit_width, format_opt_days, mood_dots, progress_bar};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    JournalInput,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub focus_idx: usize,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_mood: Option<u8>,
    pub input_error: Option<String>,
    pub status: Option<String>,

    // Cached state (refreshed on tick/action)
    pub today: NaiveDate,
    pub overview: CycleOverview,
    pub cycle_stats: CycleStats,
    pub habits: Vec<HabitSummary>,
    pub daily_counts: Vec<(NaiveDate, u32)>,
    pub journal: Vec<JournalEntry>,
    pub timeline: Vec<HealthEntry>,
}

impl App {
    pub fn new(config: AppConfig, today: NaiveDate) -> Self {
        App {
            view: View::Dashboard,
            config,
            focus_idx: 0,
            should_quit: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_mood: None,
            input_error: None,
            status: None,
            today,
            overview: CycleOverview::empty(),
            cycle_stats: CycleStats::default(),
            habits: Vec::new(),
            daily_counts: Vec::new(),
            journal: Vec::new(),
            timeline: Vec::new(),
        }
    }

    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        if self.config.cycle.enabled {
            self.overview = service::cycle_overview(conn, self.today)?;
            self.cycle_stats = service::cycle_stats(conn)?;
        }

        self.habits = service::habit_summaries(conn, self.today)?;
        if self.focus_idx >= self.habits.len() {
            self.focus_idx = self.habits.len().saturating_sub(1);
        }

        let grid_days = self.config.habits.grid_days().max(7);
        let start = self.today - Duration::days(grid_days - 1);
        self.daily_counts = HabitRepo::daily_counts(conn, start, self.today)?;

        if self.config.journal.enabled {
            self.journal = JournalRepo::list(conn, 5)?;
        }
        self.timeline = TimelineRepo::list(conn, None, 5)?;

        Ok(())
    }

    /// Reload when the calendar day changes under a long-running session.
    pub fn tick(&mut self, conn: &Connection, now: NaiveDate) {
        if now != self.today {
            self.today = now;
            if let Err(e) = self.load(conn) {
                log::error!("reload after date change failed: {:#}", e);
            }
        }
    }

    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent, conn: &Connection) {
        // Some terminals also report release and repeat events
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.input_mode {
            InputMode::JournalInput => self.handle_journal_input(key, conn),
            InputMode::Normal => self.handle_normal_key(key, conn),
        }
    }

    fn handle_normal_key(&mut self, key: crossterm::event::KeyEvent, conn: &Connection) {
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key, conn),
            View::Stats => self.handle_stats_key(key),
            View::Help => self.handle_help_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: crossterm::event::KeyEvent, conn: &Connection) {
        self.status = None;
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('s') => {
                self.view = View::Stats;
            }
            KeyCode::Char('j') if self.config.journal.enabled => {
                self.input_mode = InputMode::JournalInput;
                self.input_buffer.clear();
                self.input_mood = None;
                self.input_error = None;
            }
            KeyCode::Up => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down => {
                let max = self.habits.len().saturating_sub(1);
                if self.focus_idx < max {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Char('m') | KeyCode::Enter => {
                self.toggle_focused_habit(conn);
            }
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: crossterm::event::KeyEvent) {
        if let KeyCode::Esc | KeyCode::Char('s') = key.code {
            self.view = View::Dashboard;
        }
    }

    fn handle_help_key(&mut self, key: crossterm::event::KeyEvent) {
        if let KeyCode::Esc | KeyCode::Char('?') = key.code {
            self.view = View::Dashboard;
        }
    }

    fn handle_journal_input(&mut self, key: crossterm::event::KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Enter => {
                let body = self.input_buffer.trim().to_string();
                if body.is_empty() {
                    self.input_error = Some("Write something first".to_string());
                    return;
                }
                match service::write_journal(conn, self.today, self.input_mood, &body) {
                    Ok(_) => {
                        if let Err(e) = self.load(conn) {
                            log::error!("reload after journal entry failed: {:#}", e);
                        }
                        self.input_mode = InputMode::Normal;
                        self.input_buffer.clear();
                        self.input_error = None;
                        self.status = Some("Journal entry saved".to_string());
                    }
                    Err(e) => {
                        self.input_error = Some(e.to_string());
                    }
                }
            }
            // Mood: ↑ brighter, ↓ darker, below 1 clears it
            KeyCode::Up => {
                self.input_mood = Some(self.input_mood.map_or(3, |m| (m + 1).min(5)));
            }
            KeyCode::Down => {
                self.input_mood = match self.input_mood {
                    Some(m) if m > 1 => Some(m - 1),
                    _ => None,
                };
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    fn toggle_focused_habit(&mut self, conn: &Connection) {
        let Some(summary) = self.habits.get(self.focus_idx) else {
            return;
        };
        let habit = summary.habit.clone();
        match service::toggle_today(conn, &habit, self.today) {
            Ok(_) => {
                if let Err(e) = self.load(conn) {
                    log::error!("reload after toggling '{}' failed: {:#}", habit.name, e);
                }
            }
            Err(e) => {
                log::error!("toggling '{}' failed: {:#}", habit.name, e);
                self.status = Some(format!("Could not update {}", habit.name));
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }

        if self.input_mode == InputMode::JournalInput {
            self.draw_journal_input(frame);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0], self.today, &self.overview);

        match &self.status {
            Some(msg) => {
                let line = Line::from(Span::styled(format!("  {}", msg), theme::sage()));
                frame.render_widget(Paragraph::new(line), outer_chunks[2]);
            }
            None => statusbar::render(frame, outer_chunks[2], self.config.journal.enabled),
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        // Left column: habits + journal
        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(9)])
            .split(columns[0]);

        habits::render(frame, left_chunks[0], &self.habits, self.focus_idx);
        journal::render(frame, left_chunks[1], &self.journal, &self.timeline);

        // Right column: cycle + streak
        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(7)])
            .split(columns[1]);

        if self.config.cycle.enabled {
            cycle::render(
                frame,
                right_chunks[0],
                &self.overview,
                self.today,
                self.config.cycle.show_fertility_window,
            );
        }
        streak::render(
            frame,
            right_chunks[1],
            self.habits.get(self.focus_idx),
            self.habits.len(),
            &self.daily_counts,
            self.today,
        );
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Stats  ", theme::rose().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let mut lines = vec![Line::from("")];

        if self.config.cycle.enabled {
            lines.push(Line::from(Span::styled("  Cycle", theme::rose())));
            lines.push(Line::from(vec![
                Span::styled("  Mean length:     ", theme::dim()),
                Span::styled(
                    format!("{} days", format_opt_days(self.cycle_stats.mean_length_days)),
                    theme::bold(),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Std deviation:   ", theme::dim()),
                Span::styled(
                    format!("{} days", format_opt_days(self.cycle_stats.std_dev_days)),
                    theme::bold(),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Cycles measured: ", theme::dim()),
                Span::styled(self.cycle_stats.samples.to_string(), theme::bold()),
            ]));
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled("  Habits", theme::rose())));
        for s in &self.habits {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}", fit_width(&s.habit.name, 24)), theme::bold()),
                Span::styled(progress_bar(s.streak.current_streak, 30, 12), theme::sage()),
                Span::styled(
                    format!("  {} now · {} best", s.streak.current_streak, s.streak.longest_streak),
                    theme::dim(),
                ),
            ]));
        }
        lines.push(Line::from(""));

        let days = self.config.habits.grid_days();
        lines.push(Line::from(Span::styled(
            format!("  Last {} days", days),
            theme::rose(),
        )));
        for offset in (0..days).rev() {
            let day = self.today - Duration::days(offset);
            let done = self
                .daily_counts
                .iter()
                .find(|(d, _)| *d == day)
                .map(|(_, n)| *n)
                .unwrap_or(0);
            let total = self.habits.len() as u32;
            let style = if total > 0 && done >= total {
                theme::sage()
            } else if done > 0 {
                theme::amber()
            } else {
                theme::dim()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {}", progress_bar(done, total, 12)), style),
                Span::styled(format!("  {}  {}/{}", day, done, total), theme::dim()),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: area.height / 2,
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("  [m] / Enter  ", "Toggle habit for today"),
            ("  [↑ ↓]        ", "Move between habits"),
            ("  [j]          ", "Write a journal entry"),
            ("  [s]          ", "Stats view"),
            ("  [?]          ", "Toggle help"),
            ("  [Esc] / [q]  ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::rose().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, action) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(key, theme::rose()),
                Span::styled(action, theme::dim()),
            ]));
        }
        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(
            "  Periods, timeline: see `bloom --help`",
            theme::dim(),
        )));

        let block = Block::default()
            .title(Span::styled(" Help ", theme::rose()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::rose())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_journal_input(&self, frame: &mut Frame) {
        let area = frame.area();
        let height = if self.input_error.is_some() { 9 } else { 7 };

        let popup_area = Rect {
            x: area.width / 6,
            y: (area.height / 2).saturating_sub(4),
            width: area.width * 2 / 3,
            height: height.min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  ", theme::dim()),
                Span::styled(self.input_buffer.as_str(), theme::bold()),
                Span::styled("█", theme::rose()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Mood  ", theme::dim()),
                Span::styled(mood_dots(self.input_mood), theme::amber()),
            ]),
            Line::from(Span::styled(
                "  [Enter] save  ·  [↑↓] mood  ·  [Esc] cancel",
                theme::dim(),
            )),
        ];

        if let Some(err) = &self.input_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let border_style = if self.input_error.is_some() {
            theme::red()
        } else {
            theme::rose()
        };

        let block = Block::default()
            .title(Span::styled(" Journal ", theme::rose()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let mut app = App::new(config, to_calendar_day(&Local::now()));
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(std::time::Duration::from_secs(1));

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key, &conn);
                    if app.should_quit {
                        return Ok(());
                    }
                }
                Event::Tick => {
                    app.tick(&conn, to_calendar_day(&Local::now()));
                }
                Event::Resize => {}
            }
        }
    })();

    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn setup() -> (Connection, App) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        service::add_habit(&conn, "Stretch", None).unwrap();
        service::add_habit(&conn, "Drink water", None).unwrap();
        service::log_period(&conn, today() - Duration::days(40), None, None).unwrap();
        service::log_period(&conn, today() - Duration::days(12), None, None).unwrap();

        let mut app = App::new(AppConfig::default(), today());
        app.load(&conn).unwrap();
        (conn, app)
    }

    fn press(app: &mut App, conn: &Connection, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), conn);
    }

    #[test]
    fn loads_dashboard_state() {
        let (_conn, app) = setup();
        assert_eq!(app.habits.len(), 2);
        assert_eq!(app.overview.current_day, 13);
        assert!(app.overview.next_predicted.is_some());
    }

    #[test]
    fn enter_toggles_focused_habit() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Down);
        press(&mut app, &conn, KeyCode::Enter);

        assert!(!app.habits[0].done_today);
        assert!(app.habits[1].done_today);
        assert_eq!(app.habits[1].streak.current_streak, 1);

        press(&mut app, &conn, KeyCode::Char('m'));
        assert!(!app.habits[1].done_today);
    }

    #[test]
    fn focus_stays_in_bounds() {
        let (conn, mut app) = setup();
        for _ in 0..5 {
            press(&mut app, &conn, KeyCode::Down);
        }
        assert_eq!(app.focus_idx, 1);
        for _ in 0..5 {
            press(&mut app, &conn, KeyCode::Up);
        }
        assert_eq!(app.focus_idx, 0);
    }

    #[test]
    fn journal_prompt_saves_entry() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Char('j'));
        assert_eq!(app.input_mode, InputMode::JournalInput);

        press(&mut app, &conn, KeyCode::Enter);
        assert!(app.input_error.is_some());

        for c in "calm".chars() {
            press(&mut app, &conn, KeyCode::Char(c));
        }
        press(&mut app, &conn, KeyCode::Up);
        press(&mut app, &conn, KeyCode::Up);
        assert_eq!(app.input_mood, Some(4));
        press(&mut app, &conn, KeyCode::Enter);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.journal.len(), 1);
        assert_eq!(app.journal[0].body, "calm");
        assert_eq!(app.journal[0].mood, Some(4));
    }

    #[test]
    fn typing_q_in_journal_does_not_quit() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Char('j'));
        press(&mut app, &conn, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.input_buffer, "q");
        press(&mut app, &conn, KeyCode::Esc);
        press(&mut app, &conn, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn day_rollover_reloads() {
        let (conn, mut app) = setup();
        let tomorrow = today() + Duration::days(1);
        app.tick(&conn, tomorrow);
        assert_eq!(app.today, tomorrow);
        assert_eq!(app.overview.current_day, 14);
    }

    #[test]
    fn every_view_renders() {
        let (conn, mut app) = setup();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();

        terminal.draw(|frame| app.draw(frame)).unwrap();
        press(&mut app, &conn, KeyCode::Char('s'));
        terminal.draw(|frame| app.draw(frame)).unwrap();
        press(&mut app, &conn, KeyCode::Esc);
        press(&mut app, &conn, KeyCode::Char('?'));
        terminal.draw(|frame| app.draw(frame)).unwrap();
        press(&mut app, &conn, KeyCode::Esc);
        press(&mut app, &conn, KeyCode::Char('j'));
        terminal.draw(|frame| app.draw(frame)).unwrap();

        // Tiny terminals must not panic either.
        let mut small = Terminal::new(TestBackend::new(20, 6)).unwrap();
        small.draw(|frame| app.draw(frame)).unwrap();
    }
}
