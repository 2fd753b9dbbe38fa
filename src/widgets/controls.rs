use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

const DASHBOARD_CONTROLS: &[(&str, &str)] = &[
    ("Tab", "View"),
    ("t", "Type"),
    ("+/-", "Top N"),
    ("e", "Export"),
    ("o", "Open"),
    ("?", "Glossary"),
    ("q", "Quit"),
];

const NO_DATA_CONTROLS: &[(&str, &str)] = &[("o", "Open"), ("r", "Retry"), ("q", "Quit")];

const PROMPT_CONTROLS: &[(&str, &str)] = &[("Enter", "Load"), ("Esc", "Cancel")];

/// Key hints along the bottom of the screen, plus the visible row count.
pub struct Controls {
    pub row_count: Option<usize>,
    pub dimmed: bool,
    pub bg: Color,
    entries: &'static [(&'static str, &'static str)],
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            row_count: None,
            dimmed: false,
            bg: Color::DarkGray,
            entries: DASHBOARD_CONTROLS,
        }
    }
}

impl Controls {
    pub fn with_row_count(row_count: usize) -> Self {
        Self {
            row_count: Some(row_count),
            ..Self::default()
        }
    }

    pub fn no_data() -> Self {
        Self {
            entries: NO_DATA_CONTROLS,
            ..Self::default()
        }
    }

    pub fn prompt() -> Self {
        Self {
            entries: PROMPT_CONTROLS,
            ..Self::default()
        }
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    pub fn entries(&self) -> &[(&'static str, &'static str)] {
        self.entries
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = self.entries.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });

        if self.row_count.is_some() {
            constraints.push(Constraint::Length(15)); // "Rows: 12345"
        }
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        for (i, (key, action)) in self.entries.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(self.bg))
                .render(layout[j + 1], buf);
        }

        let mut fill_start_idx = self.entries.len() * 2;
        if let Some(count) = self.row_count {
            Paragraph::new(format!("Rows: {}", count))
                .style(base_style.bg(self.bg).fg(if self.dimmed {
                    Color::DarkGray
                } else {
                    Color::White
                }))
                .right_aligned()
                .render(layout[fill_start_idx], buf);
            fill_start_idx += 1;
        }

        Paragraph::new("")
            .style(base_style.bg(self.bg))
            .render(layout[fill_start_idx], buf);
    }
}
