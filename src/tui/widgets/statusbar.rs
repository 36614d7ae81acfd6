use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, journal_enabled: bool) {
    let mut hints = vec![("[↑↓]", " move  "), ("[m]", " done  ")];
    if journal_enabled {
        hints.push(("[j]", " journal  "));
    }
    hints.extend([("[s]", " stats  "), ("[?]", " help  "), ("[Esc]", " quit")]);

    let mut spans = Vec::new();
    for (key, label) in &hints {
        spans.push(Span::styled(*key, theme::rose()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
