use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::HabitSummary;
use crate::tui::theme;
use crate::utils::format::fit_width;

pub fn render(frame: &mut Frame, area: Rect, habits: &[HabitSummary], focused_idx: usize) {
    let block = Block::default()
        .title(Span::styled(" Habits ", theme::rose()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(theme::surface());

    if habits.is_empty() {
        let items = vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled(
                "  No habits yet: bloom habit add <name>",
                theme::dim(),
            ))),
        ];
        frame.render_widget(List::new(items).block(block), area);
        return;
    }

    // Room for "  ● " and the streak column.
    let name_width = (area.width as usize).saturating_sub(18).clamp(8, 32);

    let items: Vec<ListItem> = habits
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let is_focused = i == focused_idx;

            let (icon, icon_style) = if s.done_today {
                ("●", theme::sage())
            } else {
                ("○", theme::dim())
            };

            let name_style = if is_focused {
                theme::rose().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };

            let streak_style = if s.streak.current_streak > 0 {
                theme::sage()
            } else {
                theme::dim()
            };

            let line = Line::from(vec![
                Span::styled(if is_focused { " ›" } else { "  " }, theme::rose()),
                Span::styled(icon, icon_style),
                Span::styled(" ", theme::dim()),
                Span::styled(fit_width(&s.habit.name, name_width), name_style),
                Span::styled(format!(" {:>3}d", s.streak.current_streak), streak_style),
                Span::styled(format!("  best {}", s.streak.longest_streak), theme::dim()),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
