pub mod budget;
pub mod controls;
pub mod debug;
pub mod efficiency;
pub mod help;
pub mod no_data;
pub mod ranking;
pub mod table_view;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Paragraph, Widget, Wrap},
};

/// Thousands-grouped number with two decimals; whole numbers drop the decimals.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && formatted.trim_matches(['0', '.']) != "" {
        "-"
    } else {
        ""
    };
    if frac_part == "00" {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        return label.to_string();
    }
    let mut out: String = label.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Centered informational message used when a view cannot be drawn.
pub fn render_info(message: &str, color: Color, area: Rect, buf: &mut Buffer) {
    Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .centered()
        .render(area, buf);
}
