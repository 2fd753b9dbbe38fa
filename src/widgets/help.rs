use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// PPR 0101 (2021) glossary: term and definition.
pub const GLOSSARY: &[(&str, &str)] = &[
    (
        "Propósito",
        "Evaluar la programación y el cumplimiento del presupuesto PPR 0101 (2021) para \
         incrementar la práctica de actividades físicas, deportivas y recreativas.",
    ),
    (
        "Entidades",
        "Gobiernos locales (municipalidades provinciales y distritales) y gobiernos regionales.",
    ),
    (
        "Fuentes",
        "DNCTD (base); Transparencia Económica, Consulta Amigable (PIA, PIM, Avance % y \
         puntajes); INEI (población 2019).",
    ),
    ("PIA", "Presupuesto Inicial de Apertura, aprobado al inicio del año fiscal."),
    (
        "PIM",
        "Presupuesto Institucional Modificado tras incorporaciones y modificaciones.",
    ),
    (
        "Avance %",
        "Ejecución de ingresos (Recaudado) y gastos (Compromiso, Devengado, Girado).",
    ),
    ("Población", "Contextualiza el tamaño de beneficiarios e incide en el puntaje."),
    (
        "Puntaje Total",
        "Suma de puntajes por PIM, Avance % y Población según rangos definidos.",
    ),
    (
        "Orden presupuestal",
        "Posición en el ranking según desempeño en ejecución y cumplimiento.",
    ),
    (
        "Crec_PIM_vs_PIA_%",
        "(PIM - PIA) / PIA × 100. Vacío cuando falta PIA, falta PIM o PIA es 0.",
    ),
    (
        "PIM_per_cápita",
        "PIM / Población. Vacío cuando falta alguno o la población es 0.",
    ),
];

/// Centered overlay listing the glossary.
pub struct GlossaryOverlay {
    pub term_color: Color,
    pub border_color: Color,
}

impl GlossaryOverlay {
    fn centered(area: Rect) -> Rect {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(area);
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(vertical[1])[1]
    }
}

impl Widget for &GlossaryOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = GlossaryOverlay::centered(area);
        Clear.render(popup, buf);

        let term_style = Style::default()
            .fg(self.term_color)
            .add_modifier(Modifier::BOLD);
        let lines: Vec<Line> = GLOSSARY
            .iter()
            .map(|(term, definition)| {
                Line::from(vec![
                    Span::styled(format!("{}: ", term), term_style),
                    Span::raw(*definition),
                ])
            })
            .collect();

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.border_color))
                    .title("Glosario PPR 0101 (2021) - Esc para cerrar"),
            )
            .render(popup, buf);
    }
}
