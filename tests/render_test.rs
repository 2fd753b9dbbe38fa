use budgetui::config::{AppConfig, Theme};
use budgetui::{App, AppEvent, DataSource};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;
use tempfile::TempDir;

mod common;

fn buffer_text(buf: &Buffer) -> String {
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

fn render(app: &mut App) -> String {
    let area = Rect::new(0, 0, 140, 40);
    let mut buf = Buffer::empty(area);
    app.render(area, &mut buf);
    buffer_text(&buf)
}

fn press(app: &mut App, code: KeyCode) {
    app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
}

fn loaded_app(dir: &TempDir) -> App {
    let path = dir.path().join("ppr.xlsx");
    common::write_ppr(&path);
    let config = AppConfig::default();
    let theme = Theme::from_config(&config.theme).expect("default theme");
    let mut app = App::new_with_config(theme, config);
    let follow_up = app.event(&AppEvent::Open(DataSource::path(&path)));
    if let Some(event) = follow_up {
        app.event(&event);
    }
    app
}

#[test]
fn test_every_tab_renders() {
    let dir = TempDir::new().unwrap();
    let mut app = loaded_app(&dir);

    let ranking = render(&mut app);
    assert!(ranking.contains("Top 15 por Puntaje Total"));

    press(&mut app, KeyCode::Char('2'));
    let budget = render(&mut app);
    assert!(budget.contains("Comparativo"));

    press(&mut app, KeyCode::Char('3'));
    let efficiency = render(&mut app);
    assert!(efficiency.contains("Avance %"));
    assert!(efficiency.contains("Local (2)"));
    assert!(efficiency.contains("Regional (1)"));

    press(&mut app, KeyCode::Char('4'));
    let explore = render(&mut app);
    assert!(explore.contains("Tabla exploratoria"));
    assert!(explore.contains("Orden Presupuestal"));
}

#[test]
fn test_help_overlay_renders_glossary() {
    let dir = TempDir::new().unwrap();
    let mut app = loaded_app(&dir);
    press(&mut app, KeyCode::Char('?'));
    let text = render(&mut app);
    assert!(text.contains("Propósito"));
}

#[test]
fn test_controls_dimmed_under_glossary() {
    let dir = TempDir::new().unwrap();
    let mut app = loaded_app(&dir);
    let area = Rect::new(0, 0, 140, 40);

    let mut buf = Buffer::empty(area);
    app.render(area, &mut buf);
    assert_eq!(buf[(1, 39)].symbol(), "T");
    assert_ne!(buf[(1, 39)].fg, Color::DarkGray);

    press(&mut app, KeyCode::Char('?'));
    let mut buf = Buffer::empty(area);
    app.render(area, &mut buf);
    assert_eq!(buf[(1, 39)].fg, Color::DarkGray);
}

#[test]
fn test_empty_app_renders() {
    let mut app = App::new();
    let text = render(&mut app);
    assert_eq!(text.lines().count(), 40);
}

#[test]
fn test_missing_budget_columns_show_message() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nombres.xlsx");
    common::write_xlsx(
        &path,
        &["Nombre", "Puntaje Total"],
        &[vec![common::V::S("A"), common::V::N(1.0)]],
    );
    let mut app = App::new();
    if let Some(event) = app.event(&AppEvent::Open(DataSource::path(&path))) {
        app.event(&event);
    }
    press(&mut app, KeyCode::Char('2'));
    let text = render(&mut app);
    assert!(text.contains("No se detectaron columnas"));
}
