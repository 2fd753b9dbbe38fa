use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Shown when no spreadsheet could be loaded: the reason, what the working
/// directories contain and, when active, a path prompt.
pub struct NoDataScreen<'a> {
    pub message: &'a str,
    pub tried: &'a [String],
    pub listing: &'a [String],
    pub prompt: Option<&'a str>,
    pub error_color: Color,
    pub border_color: Color,
    pub dimmed_color: Color,
}

impl Widget for NoDataScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let prompt_height = if self.prompt.is_some() { 3 } else { 0 };
        let tried_lines = if self.tried.is_empty() {
            0
        } else {
            self.tried.len() as u16 + 1
        };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4 + tried_lines),
                Constraint::Fill(1),
                Constraint::Length(prompt_height),
            ])
            .split(area);

        let mut lines = vec![
            Line::from(Span::styled(
                "No data could be loaded",
                Style::default()
                    .fg(self.error_color)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(self.message.to_string()),
        ];
        if !self.tried.is_empty() {
            lines.push(Line::from("Tried:"));
            lines.extend(self.tried.iter().map(|p| {
                Line::from(Span::styled(
                    format!("  {}", p),
                    Style::default().fg(self.dimmed_color),
                ))
            }));
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.border_color))
                    .title("budgetui"),
            )
            .render(layout[0], buf);

        Paragraph::new(
            self.listing
                .iter()
                .map(|l| Line::from(l.as_str()))
                .collect::<Vec<_>>(),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.border_color))
                .title("Files"),
        )
        .render(layout[1], buf);

        if let Some(input) = self.prompt {
            Paragraph::new(format!("{}▏", input))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(self.error_color))
                        .title("Open spreadsheet (path)"),
                )
                .render(layout[2], buf);
        }
    }
}
