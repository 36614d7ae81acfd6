use ratatui::style::{Color, Modifier, Style};

use crate::models::CyclePhase;

pub const BG: Color = Color::Rgb(20, 17, 20);
pub const SURFACE: Color = Color::Rgb(30, 25, 30);
pub const BORDER: Color = Color::Rgb(62, 50, 60);
pub const TEXT: Color = Color::Rgb(232, 222, 228);
pub const TEXT_DIM: Color = Color::Rgb(138, 122, 134);
pub const ROSE: Color = Color::Rgb(214, 112, 138);
pub const SAGE: Color = Color::Rgb(120, 166, 122);
pub const AMBER: Color = Color::Rgb(214, 150, 72);
pub const LAVENDER: Color = Color::Rgb(160, 140, 204);
pub const RED: Color = Color::Rgb(186, 78, 70);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn rose() -> Style {
    Style::default().fg(ROSE)
}

pub fn sage() -> Style {
    Style::default().fg(SAGE)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn lavender() -> Style {
    Style::default().fg(LAVENDER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border(focused: bool) -> Style {
    if focused {
        rose()
    } else {
        Style::default().fg(BORDER)
    }
}

pub fn phase(phase: CyclePhase) -> Style {
    match phase {
        CyclePhase::Menstrual => rose(),
        CyclePhase::Follicular => sage(),
        CyclePhase::Ovulation => amber(),
        CyclePhase::Luteal => lavender(),
        CyclePhase::Unknown => dim(),
    }
}
