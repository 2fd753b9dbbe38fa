use ratatui::{
    buffer::Buffer,
    layout::{Direction, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Widget},
};

use super::{format_number, render_info, truncate_label};

const LABEL_WIDTH: usize = 28;
// Bar lengths are integers; keep two decimals of resolution.
const VALUE_SCALE: f64 = 100.0;

/// Horizontal bars, one per entity, longest first.
pub struct RankingChart<'a> {
    series: &'a [(String, f64)],
    title: String,
    bar_color: Color,
    border_color: Color,
    text_color: Color,
}

impl<'a> RankingChart<'a> {
    pub fn new(series: &'a [(String, f64)]) -> Self {
        Self {
            series,
            title: String::new(),
            bar_color: Color::Cyan,
            border_color: Color::Cyan,
            text_color: Color::White,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn bar_color(mut self, color: Color) -> Self {
        self.bar_color = color;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }

    pub fn text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }
}

/// Integer bar length for a value. Negative values draw as empty bars.
pub fn bar_length(value: f64) -> u64 {
    (value.max(0.0) * VALUE_SCALE).round() as u64
}

impl Widget for RankingChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color))
            .title(self.title);
        let inner = block.inner(area);
        block.render(area, buf);

        if self.series.is_empty() {
            render_info("No numeric values to rank", self.text_color, inner, buf);
            return;
        }

        let bars: Vec<Bar> = self
            .series
            .iter()
            .map(|(label, value)| {
                Bar::default()
                    .label(Line::from(truncate_label(label, LABEL_WIDTH)))
                    .value(bar_length(*value))
                    .text_value(format_number(*value))
                    .style(Style::default().fg(self.bar_color))
                    .value_style(Style::default().fg(Color::Black).bg(self.bar_color))
            })
            .collect();

        BarChart::default()
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .label_style(Style::default().fg(self.text_color))
            .data(BarGroup::default().bars(&bars))
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_length() {
        assert_eq!(bar_length(85.25), 8525);
        assert_eq!(bar_length(-3.0), 0);
        assert_eq!(bar_length(0.004), 0);
    }

    #[test]
    fn test_empty_series_shows_message() {
        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        RankingChart::new(&[]).title("Ranking").render(area, &mut buf);
        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        assert!(text.contains("No numeric values"));
    }
}
