//! PIA vs PIM: grouped bars per entity above the comparison table.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Widget},
};

use super::table_view::TableView;
use super::{format_number, truncate_label};
use crate::chart_data::BudgetPair;
use crate::table::Table;

const GROUP_LABEL_WIDTH: usize = 10;

pub struct BudgetComparison<'a> {
    pairs: &'a [BudgetPair],
    table: &'a Table,
    initial_color: Color,
    modified_color: Color,
    border_color: Color,
    header_color: Color,
    picker_hint: Option<String>,
}

impl<'a> BudgetComparison<'a> {
    pub fn new(pairs: &'a [BudgetPair], table: &'a Table) -> Self {
        Self {
            pairs,
            table,
            initial_color: Color::Cyan,
            modified_color: Color::Magenta,
            border_color: Color::Cyan,
            header_color: Color::White,
            picker_hint: None,
        }
    }

    pub fn colors(mut self, initial: Color, modified: Color) -> Self {
        self.initial_color = initial;
        self.modified_color = modified;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }

    pub fn header_color(mut self, color: Color) -> Self {
        self.header_color = color;
        self
    }

    /// Entity picker state shown after the chart title.
    pub fn picker_hint(mut self, hint: impl Into<String>) -> Self {
        self.picker_hint = Some(hint.into());
        self
    }
}

/// Bars are scaled so the largest amount fits in `u64` with room to spare.
fn scale_for(pairs: &[BudgetPair]) -> f64 {
    let max = pairs
        .iter()
        .flat_map(|p| [p.initial, p.modified])
        .flatten()
        .fold(0.0_f64, f64::max);
    if max > 0.0 {
        1_000_000.0 / max
    } else {
        1.0
    }
}

impl Widget for BudgetComparison<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Fill(1)])
            .split(area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color))
            .title(Line::from(vec![
                "PIA".fg(self.initial_color),
                " vs ".into(),
                "PIM".fg(self.modified_color),
                " por entidad".into(),
            ]));
        let block = match &self.picker_hint {
            Some(hint) => block.title(Line::from(format!(" {} ", hint)).right_aligned()),
            None => block,
        };
        let inner = block.inner(layout[0]);
        block.render(layout[0], buf);

        let scale = scale_for(self.pairs);
        let bar = |value: Option<f64>, color: Color| {
            let v = value.unwrap_or(0.0);
            Bar::default()
                .value((v.max(0.0) * scale).round() as u64)
                .text_value(value.map(format_number).unwrap_or_default())
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        };

        let mut chart = BarChart::default()
            .direction(Direction::Vertical)
            .bar_width(3)
            .bar_gap(0)
            .group_gap(2);
        for pair in self.pairs {
            chart = chart.data(
                BarGroup::default()
                    .label(Line::from(truncate_label(&pair.label, GROUP_LABEL_WIDTH)))
                    .bars(&[
                        bar(pair.initial, self.initial_color),
                        bar(pair.modified, self.modified_color),
                    ]),
            );
        }
        chart.render(inner, buf);

        TableView::new(self.table)
            .title("Comparativo")
            .border_color(self.border_color)
            .header_color(self.header_color)
            .render(layout[1], buf);
    }
}
