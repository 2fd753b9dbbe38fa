use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell as TuiCell, Row, Table as TuiTable, Widget},
};

use super::{format_number, truncate_label};
use crate::table::{Cell, Table};

const MAX_COLUMN_WIDTH: usize = 32;

/// Display text for a cell: numbers grouped and rounded, text as-is.
pub fn display_cell(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) => format_number(*n),
        Cell::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Bordered, read-only rendering of a [`Table`].
pub struct TableView<'a> {
    table: &'a Table,
    title: String,
    header_color: Color,
    border_color: Color,
}

impl<'a> TableView<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            title: String::new(),
            header_color: Color::White,
            border_color: Color::Cyan,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn header_color(mut self, color: Color) -> Self {
        self.header_color = color;
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }

    /// Width of each column: the widest of header and cells, capped.
    pub fn column_widths(&self) -> Vec<u16> {
        self.table
            .columns()
            .iter()
            .map(|c| {
                let widest = c
                    .cells
                    .iter()
                    .map(|cell| display_cell(cell).chars().count())
                    .chain(std::iter::once(c.name.chars().count()))
                    .max()
                    .unwrap_or(0);
                widest.clamp(3, MAX_COLUMN_WIDTH) as u16
            })
            .collect()
    }
}

impl Widget for TableView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let widths = self.column_widths();
        let header = Row::new(self.table.columns().iter().zip(&widths).map(|(c, w)| {
            TuiCell::from(truncate_label(&c.name, *w as usize))
        }))
        .style(
            Style::default()
                .fg(self.header_color)
                .add_modifier(Modifier::BOLD),
        );

        let rows = (0..self.table.height()).map(|i| {
            Row::new(
                self.table
                    .row(i)
                    .into_iter()
                    .zip(&widths)
                    .map(|(cell, w)| {
                        let text = truncate_label(&display_cell(cell), *w as usize);
                        match cell {
                            Cell::Number(_) => {
                                TuiCell::from(Line::from(text).right_aligned())
                            }
                            _ => TuiCell::from(text),
                        }
                    }),
            )
        });

        TuiTable::new(rows, widths.iter().map(|w| Constraint::Length(*w)))
            .header(header)
            .column_spacing(2)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.border_color))
                    .title(self.title),
            )
            .render(area, buf);
    }
}
