use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Widget},
};

use super::{format_number, render_info};
use crate::chart_data::{bounds, ScatterGroup};

/// Execution percent is plotted on a fixed 0-110 axis so over-execution stays visible.
pub const PERCENT_AXIS: [f64; 2] = [0.0, 110.0];

/// Scatter of modified budget (x) against execution percent (y), one
/// series per government type.
pub struct EfficiencyChart<'a> {
    groups: &'a [ScatterGroup],
    x_title: String,
    y_title: String,
    palette: Vec<Color>,
    border_color: Color,
    text_color: Color,
}

impl<'a> EfficiencyChart<'a> {
    pub fn new(groups: &'a [ScatterGroup]) -> Self {
        Self {
            groups,
            x_title: "PIM".to_string(),
            y_title: "Avance %".to_string(),
            palette: vec![Color::Green],
            border_color: Color::Cyan,
            text_color: Color::White,
        }
    }

    pub fn axis_titles(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_title = x.into();
        self.y_title = y.into();
        self
    }

    /// Series colors, cycled when there are more groups than colors.
    pub fn palette(mut self, palette: Vec<Color>) -> Self {
        if !palette.is_empty() {
            self.palette = palette;
        }
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

fn axis_labels(bounds: [f64; 2], style: Style) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .into_iter()
        .map(|v| Span::styled(format_number(v), style))
        .collect()
}

impl Widget for EfficiencyChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color))
            .title(format!("Eficiencia: {} vs {}", self.y_title, self.x_title));

        let all: Vec<(f64, f64)> = self
            .groups
            .iter()
            .flat_map(|g| g.points.iter().copied())
            .collect();
        let Some((x_bounds, _)) = bounds(&all) else {
            let inner = block.inner(area);
            block.render(area, buf);
            render_info(
                "No rows with both PIM and execution percent",
                self.text_color,
                inner,
                buf,
            );
            return;
        };

        let label_style = Style::default().fg(self.text_color);
        let datasets: Vec<Dataset> = self
            .groups
            .iter()
            .zip(self.palette.iter().cycle())
            .map(|(group, color)| {
                Dataset::default()
                    .name(format!("{} ({})", group.label, group.points.len()))
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(*color))
                    .data(&group.points)
            })
            .collect();

        Chart::new(datasets)
            .block(block)
            .legend_position(Some(LegendPosition::TopRight))
            .x_axis(
                Axis::default()
                    .title(self.x_title.clone())
                    .bounds(x_bounds)
                    .style(label_style)
                    .labels(axis_labels(x_bounds, label_style)),
            )
            .y_axis(
                Axis::default()
                    .title(self.y_title.clone())
                    .bounds(PERCENT_AXIS)
                    .style(label_style)
                    .labels(axis_labels(PERCENT_AXIS, label_style)),
            )
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_legend_lists_each_group() {
        let groups = vec![
            ScatterGroup {
                label: "Local".to_string(),
                points: vec![(10.0, 80.0), (40.0, 60.0)],
            },
            ScatterGroup {
                label: "Regional".to_string(),
                points: vec![(20.0, 95.0)],
            },
        ];
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        EfficiencyChart::new(&groups)
            .palette(vec![Color::Green, Color::Magenta])
            .render(area, &mut buf);
        let rendered = text(&buf);
        assert!(rendered.contains("Local (2)"));
        assert!(rendered.contains("Regional (1)"));
    }

    #[test]
    fn test_empty_groups_show_message() {
        let area = Rect::new(0, 0, 80, 10);
        let mut buf = Buffer::empty(area);
        EfficiencyChart::new(&[]).render(area, &mut buf);
        assert!(text(&buf).contains("No rows with both PIM"));
    }
}
