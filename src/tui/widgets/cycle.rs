use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::CycleOverview;
use crate::tui::theme;
use crate::utils::format::{format_day, format_relative};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    overview: &CycleOverview,
    today: NaiveDate,
    show_fertility: bool,
) {
    let block = Block::default()
        .title(Span::styled(" Cycle ", theme::rose()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let Some(last) = overview.last_period else {
        let content = vec![
            Line::from(""),
            Line::from(Span::styled("  No period logged", theme::dim())),
            Line::from(""),
            Line::from(Span::styled("  bloom period log YYYY-MM-DD", theme::dim())),
        ];
        frame.render_widget(Paragraph::new(content).block(block), area);
        return;
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("  {}", overview.current_phase.display_name().to_uppercase()),
                theme::phase(overview.current_phase).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  day {}", overview.current_day), theme::dim()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Last     ", theme::dim()),
            Span::styled(format_day(last), theme::bold()),
        ]),
    ];

    match &overview.next_predicted {
        Some(p) => {
            lines.push(Line::from(vec![
                Span::styled("  Next     ", theme::dim()),
                Span::styled(format_day(p.predicted_period_start), theme::rose()),
                Span::styled(
                    format!("  {}", format_relative(p.predicted_period_start, today)),
                    theme::dim(),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Ovulate  ", theme::dim()),
                Span::styled(
                    format!(
                        "{} – {}",
                        p.predicted_ovulation_start.format("%b %d"),
                        p.predicted_ovulation_end.format("%b %d")
                    ),
                    theme::amber(),
                ),
            ]));
            if show_fertility {
                if let Some(window) = overview.fertility_window {
                    let style = if window.contains(today) {
                        theme::amber().add_modifier(Modifier::BOLD)
                    } else {
                        theme::dim()
                    };
                    lines.push(Line::from(vec![
                        Span::styled("  Fertile  ", theme::dim()),
                        Span::styled(
                            format!("{} – {}", window.start.format("%b %d"), window.end.format("%b %d")),
                            style,
                        ),
                    ]));
                }
            }
        }
        None => lines.push(Line::from(Span::styled(
            "  Log one more period to predict",
            theme::dim(),
        ))),
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
