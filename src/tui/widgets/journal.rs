use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::{HealthEntry, JournalEntry};
use crate::tui::theme;
use crate::utils::format::{format_day, mood_dots};

pub fn render(frame: &mut Frame, area: Rect, journal: &[JournalEntry], timeline: &[HealthEntry]) {
    let block = Block::default()
        .title(Span::styled(" Journal & Timeline ", theme::rose()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let mut lines = vec![Line::from("")];

    match journal.first() {
        Some(entry) => {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}  ", format_day(entry.date)), theme::dim()),
                Span::styled(mood_dots(entry.mood), theme::amber()),
            ]));
            let first_line = entry.body.lines().next().unwrap_or("");
            lines.push(Line::from(Span::styled(format!("  {}", first_line), theme::bold())));
        }
        None => lines.push(Line::from(Span::styled(
            "  No journal entries · press [j] to write",
            theme::dim(),
        ))),
    }

    if !timeline.is_empty() {
        lines.push(Line::from(""));
        for e in timeline.iter().take(3) {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}  ", e.date.format("%b %d")), theme::dim()),
                Span::styled(format!("{:<12}", e.category.display_name()), theme::lavender()),
                Span::styled(e.title.as_str(), theme::bold()),
            ]));
        }
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
