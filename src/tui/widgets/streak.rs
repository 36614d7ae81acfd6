use chrono::{Duration, NaiveDate};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::HabitSummary;
use crate::tui::theme;
use crate::utils::format::progress_bar;

/// Streak bar for the focused habit and a dot per day for all habits.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    focused: Option<&HabitSummary>,
    habit_count: usize,
    daily_counts: &[(NaiveDate, u32)],
    today: NaiveDate,
) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::rose()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let mut dot_spans = vec![Span::styled("  ", theme::dim())];
    for offset in (0..7).rev() {
        let day = today - Duration::days(offset);
        let done = daily_counts
            .iter()
            .find(|(d, _)| *d == day)
            .map(|(_, n)| *n as usize)
            .unwrap_or(0);
        let (dot, style) = if habit_count > 0 && done >= habit_count {
            ("●", theme::sage().add_modifier(Modifier::BOLD))
        } else if done > 0 {
            ("◑", theme::amber())
        } else {
            ("○", theme::dim())
        };
        dot_spans.push(Span::styled(dot, style));
        dot_spans.push(Span::styled("  ", theme::dim()));
    }

    let mut text = vec![Line::from("")];
    match focused {
        Some(s) => {
            // Bar fills over 30 days
            let bar = progress_bar(s.streak.current_streak, 30, 12);
            text.push(Line::from(vec![
                Span::styled("  ", theme::dim()),
                Span::styled(bar, theme::sage()),
                Span::styled(
                    format!("  {} days", s.streak.current_streak),
                    theme::sage().add_modifier(Modifier::BOLD),
                ),
            ]));
            text.push(Line::from(Span::styled(
                format!("  {}  ·  best {}", s.habit.name, s.streak.longest_streak),
                theme::dim(),
            )));
        }
        None => text.push(Line::from(Span::styled("  Nothing to count yet", theme::dim()))),
    }
    text.push(Line::from(""));
    text.push(Line::from(dot_spans));

    let paragraph = Paragraph::new(text).block(block);
    frame.render_widget(paragraph, area);
}
