use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::CycleOverview;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, today: NaiveDate, overview: &CycleOverview) {
    let date_str = today.format("%A, %b %d, %Y").to_string();

    let title_line = Line::from(vec![
        Span::styled("  ✿  ", theme::rose().add_modifier(Modifier::BOLD)),
        Span::styled("bloom", theme::rose().add_modifier(Modifier::BOLD)),
    ]);

    let mut date_spans = vec![Span::styled(date_str, theme::dim())];
    if overview.last_period.is_some() {
        date_spans.push(Span::styled("  ·  ", theme::dim()));
        date_spans.push(Span::styled(
            format!("{} · day {}", overview.current_phase, overview.current_day),
            theme::phase(overview.current_phase),
        ));
    }
    if let Some(days) = overview.days_until_next_period(today) {
        date_spans.push(Span::styled("  ·  ", theme::dim()));
        let label = match days {
            d if d < 0 => format!("period {} days late", -d),
            0 => "period due today".to_string(),
            d => format!("period in {} days", d),
        };
        date_spans.push(Span::styled(label, theme::amber()));
    }

    let text = vec![title_line, Line::from(""), Line::from(date_spans)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::rose().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
