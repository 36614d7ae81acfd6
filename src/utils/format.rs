use chrono::NaiveDate;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// "1 day" / "3 days"
pub fn format_days(days: i64) -> String {
    if days.abs() == 1 {
        format!("{} day", days)
    } else {
        format!("{} days", days)
    }
}

/// Short human date, e.g. "Mon, Jan 29"
pub fn format_day(date: NaiveDate) -> String {
    date.format("%a, %b %d").to_string()
}

/// Relative phrasing for a date compared with today.
pub fn format_relative(date: NaiveDate, today: NaiveDate) -> String {
    let delta = (date - today).num_days();
    match delta {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        d if d > 1 => format!("in {}", format_days(d)),
        d => format!("{} ago", format_days(-d)),
    }
}

/// Format a mean/std-dev value to one decimal place, or a dash.
pub fn format_opt_days(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "–".to_string(),
    }
}

/// Mood 1..=5 as filled and empty dots.
pub fn mood_dots(mood: Option<u8>) -> String {
    match mood {
        Some(m) => {
            let filled = m.min(5) as usize;
            format!("{}{}", "●".repeat(filled), "○".repeat(5 - filled))
        }
        None => "     ".to_string(),
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Pad or cut user text to an exact terminal column width.
pub fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        let padding = width - text.width();
        return format!("{}{}", text, " ".repeat(padding));
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn relative_dates() {
        let today = date("2024-06-15");
        assert_eq!(format_relative(today, today), "today");
        assert_eq!(format_relative(date("2024-06-16"), today), "tomorrow");
        assert_eq!(format_relative(date("2024-06-14"), today), "yesterday");
        assert_eq!(format_relative(date("2024-06-20"), today), "in 5 days");
        assert_eq!(format_relative(date("2024-06-12"), today), "3 days ago");
    }

    #[test]
    fn mood_dot_strip() {
        assert_eq!(mood_dots(Some(3)), "●●●○○");
        assert_eq!(mood_dots(None).len(), 5);
    }

    #[test]
    fn progress_bar_clamps() {
        assert_eq!(progress_bar(3, 6, 4), "██░░");
        assert_eq!(progress_bar(9, 6, 4), "████");
        assert_eq!(progress_bar(1, 0, 3), "░░░");
    }

    #[test]
    fn fit_width_pads_and_truncates() {
        assert_eq!(fit_width("Yoga", 6), "Yoga  ");
        assert_eq!(fit_width("Stretching", 6), "Stret…");
        // Wide characters take two columns each.
        assert_eq!(fit_width("水を飲む習慣", 6).width(), 6);
    }
}
