use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Paragraph, Tabs};

pub mod cache;
pub mod chart_data;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod numeric;
pub mod pipeline;
pub mod roles;
pub mod scale;
pub mod source;
pub mod table;
pub mod view;
pub mod widgets;

pub use budgetui_cli::{Args, CompressionFormat};
pub use cache::{CacheManager, TableCache};
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use dashboard::Dashboard;
pub use export::{export_table, ExportOptions};
pub use pipeline::{augment, Augmented, PipelineOptions};
pub use roles::{Role, RoleAliases};
pub use source::{DataSource, LoadError, LoadOptions};
pub use table::{Cell, Table};

use source::{diagnostic_listing, load_first_available};
use widgets::budget::BudgetComparison;
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::efficiency::EfficiencyChart;
use widgets::help::GlossaryOverlay;
use widgets::no_data::NoDataScreen;
use widgets::ranking::RankingChart;
use widgets::render_info;
use widgets::table_view::TableView;

/// Application name used for config and cache directories
pub const APP_NAME: &str = "budgetui";

pub enum AppEvent {
    Key(KeyEvent),
    /// Load a specific source. Shows a loading message first.
    Open(DataSource),
    /// Try the configured default paths in order.
    OpenDefault,
    DoLoad(DataSource), // Internal event to actually perform loading after UI update
    DoLoadDefault,
    Export(PathBuf),
    Exit,
    Crash(String),
    Resize(u16, u16), // resized (width, height)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Ranking,
    Budget,
    Efficiency,
    Explore,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Ranking, Tab::Budget, Tab::Efficiency, Tab::Explore];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Ranking => "Ranking",
            Tab::Budget => "PIA vs PIM",
            Tab::Efficiency => "Avance % vs PIM",
            Tab::Explore => "Tabla exploratoria",
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Why nothing is loaded, and what was around to load.
pub struct NoData {
    pub message: String,
    pub tried: Vec<String>,
    pub listing: Vec<String>,
}

impl NoData {
    fn new(message: String, tried: Vec<String>) -> Self {
        Self {
            message,
            tried,
            listing: diagnostic_listing(&[Path::new("."), Path::new("data")]),
        }
    }
}

pub struct App {
    config: AppConfig,
    pipeline: PipelineOptions,
    load_options: LoadOptions,
    cache: TableCache,
    dashboard: Option<Dashboard>,
    no_data: Option<NoData>,
    prompt: Option<String>,
    loading: Option<String>,
    tab: Tab,
    top_n: usize,
    type_filter: Option<String>,
    show_help: bool,
    status: Option<String>,
    debug: DebugState,
    theme: Theme,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> App {
        Self::new_with_config(Theme::default(), AppConfig::default())
    }

    pub fn new_with_config(theme: Theme, config: AppConfig) -> App {
        let mut load_options = LoadOptions::default();
        if let Some(sheet) = &config.data.sheet {
            load_options = load_options.with_sheet(sheet.clone());
        }
        let debug = DebugState {
            enabled: config.debug.enabled,
            ..DebugState::default()
        };
        App {
            pipeline: config.pipeline_options(),
            load_options,
            cache: TableCache::new(),
            dashboard: None,
            no_data: None,
            prompt: None,
            loading: None,
            tab: Tab::default(),
            top_n: config.display.top_n,
            type_filter: None,
            show_help: false,
            status: None,
            debug,
            theme,
            config,
        }
    }

    /// Government type to select once data is loaded.
    pub fn with_type_filter(mut self, value: Option<String>) -> Self {
        self.type_filter = value;
        self
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    pub fn no_data(&self) -> Option<&NoData> {
        self.no_data.as_ref()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn is_showing_help(&self) -> bool {
        self.show_help
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    fn show_table(&mut self, source: DataSource, raw: &Table) {
        let mut dashboard = Dashboard::new(source, raw, &self.pipeline);
        self.status = None;
        if let Some(value) = self.type_filter.as_deref() {
            if !dashboard.select_filter(value) {
                warn!(value, "type filter not found");
                self.status = Some(format!("Tipo de gobierno '{}' no encontrado", value));
            }
        }
        if dashboard.augmented().percent_rescaled && self.status.is_none() {
            self.status = Some("Avance % convertido de fracción a porcentaje".to_string());
        }
        self.debug.roles = Some(dashboard.recognized());
        self.debug.table_reads = self.cache.reads();
        self.dashboard = Some(dashboard);
        self.no_data = None;
        self.loading = None;
    }

    fn show_no_data(&mut self, error: &LoadError, tried: Vec<String>) {
        warn!(error = %error, "no data loaded");
        self.loading = None;
        // Keep showing what is already loaded.
        if self.dashboard.is_some() {
            self.status = Some(error.to_string());
            return;
        }
        self.no_data = Some(NoData::new(error.to_string(), tried));
    }

    fn load(&mut self, source: DataSource) {
        match self.cache.load(&source, &self.load_options) {
            Ok(table) => {
                info!(source = %source, rows = table.height(), "loaded data");
                self.show_table(source, &table);
            }
            Err(e) => {
                let tried = vec![source.name()];
                self.show_no_data(&e, tried);
            }
        }
    }

    fn load_default(&mut self) {
        let paths = self.config.data.default_paths.clone();
        match load_first_available(&paths, &self.load_options, &mut self.cache) {
            Ok((table, source)) => self.show_table(source, &table),
            Err(e) => {
                let tried = paths.iter().map(|p| p.display().to_string()).collect();
                self.show_no_data(&e, tried);
            }
        }
    }

    /// Write the filtered view to `path` with the configured export options.
    pub fn export(&self, path: &Path) -> Result<PathBuf> {
        let dashboard = self
            .dashboard
            .as_ref()
            .ok_or_else(|| eyre!("No data loaded"))?;
        export_table(dashboard.view(), path, &self.config.export_options())
    }

    fn set_top_n(&mut self, n: usize) {
        self.top_n = n.clamp(self.config.display.top_n_min, self.config.display.top_n_max);
    }

    fn prompt_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let input = self.prompt.as_mut()?;
        match event.code {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Esc => self.prompt = None,
            KeyCode::Enter => {
                let path = PathBuf::from(input.trim());
                if path.as_os_str().is_empty() {
                    return None;
                }
                match DataSource::upload_from_file(&path) {
                    Ok(source) => {
                        self.prompt = None;
                        return Some(AppEvent::Open(source));
                    }
                    Err(e) => self.status = Some(e.to_string()),
                }
            }
            _ => {}
        }
        None
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        self.debug.on_key(event);

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }
        if self.prompt.is_some() {
            self.debug.last_action = "prompt".to_string();
            return self.prompt_key(event);
        }
        if self.show_help {
            if matches!(
                event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return None;
        }

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('?') => {
                self.show_help = true;
                self.debug.last_action = "help".to_string();
                return None;
            }
            KeyCode::Char('o') => {
                self.prompt = Some(String::new());
                self.debug.last_action = "open_prompt".to_string();
                return None;
            }
            KeyCode::Char('r') => {
                self.debug.last_action = "reload".to_string();
                return Some(match &self.dashboard {
                    Some(d) => AppEvent::Open(d.source().clone()),
                    None => AppEvent::OpenDefault,
                });
            }
            _ => {}
        }

        if self.dashboard.is_none() {
            return None;
        }
        let action = match event.code {
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.tab = self.tab.next();
                "next_tab"
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.tab = self.tab.prev();
                "prev_tab"
            }
            KeyCode::Char(c @ '1'..='4') => {
                self.tab = Tab::ALL[c as usize - '1' as usize];
                "select_tab"
            }
            KeyCode::Char('t') => {
                if let Some(d) = self.dashboard.as_mut() {
                    d.cycle_filter(true);
                }
                "next_type"
            }
            KeyCode::Char('T') => {
                if let Some(d) = self.dashboard.as_mut() {
                    d.cycle_filter(false);
                }
                "prev_type"
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.set_top_n(self.top_n + 1);
                "top_n_up"
            }
            KeyCode::Char('-') => {
                self.set_top_n(self.top_n.saturating_sub(1));
                "top_n_down"
            }
            KeyCode::Char('[') | KeyCode::Char(']') if self.tab == Tab::Budget => {
                if let Some(d) = self.dashboard.as_mut() {
                    d.move_entity_cursor(event.code == KeyCode::Char(']'));
                }
                "move_entity"
            }
            KeyCode::Char(' ') if self.tab == Tab::Budget => {
                let limit = self.config.display.compare_limit;
                if let Some(d) = self.dashboard.as_mut() {
                    if !d.toggle_entity(limit) {
                        self.status = Some(format!("Máximo {} entidades seleccionadas", limit));
                    }
                }
                "toggle_entity"
            }
            KeyCode::Backspace if self.tab == Tab::Budget => {
                if let Some(d) = self.dashboard.as_mut() {
                    d.clear_picked();
                }
                "clear_entities"
            }
            KeyCode::Char('e') => {
                self.debug.last_action = "export".to_string();
                return Some(AppEvent::Export(PathBuf::from(&self.config.export.file_name)));
            }
            _ => return None,
        };
        self.debug.last_action = action.to_string();
        None
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(source) => {
                self.loading = Some(format!("Cargando {}", source));
                Some(AppEvent::DoLoad(source.clone()))
            }
            AppEvent::OpenDefault => {
                self.loading = Some("Cargando datos".to_string());
                Some(AppEvent::DoLoadDefault)
            }
            AppEvent::DoLoad(source) => {
                self.load(source.clone());
                None
            }
            AppEvent::DoLoadDefault => {
                self.load_default();
                None
            }
            AppEvent::Export(path) => {
                self.status = Some(match self.export(path) {
                    Ok(written) => format!(
                        "Exportado {} filas a {}",
                        self.dashboard.as_ref().map(|d| d.view().height()).unwrap_or(0),
                        written.display()
                    ),
                    Err(e) => {
                        warn!(error = %e, "export failed");
                        format!("Error al exportar: {}", e)
                    }
                });
                None
            }
            AppEvent::Resize(_, _) => None,
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn status_line(&self) -> String {
        let mut parts = Vec::new();
        if let Some(d) = &self.dashboard {
            parts.push(format!("Fuente: {}", d.source()));
            if d.filter_enabled() {
                parts.push(format!("Tipo: {}", d.selected_filter()));
            }
            parts.push(format!("Top {}", self.top_n));
            let (found, total) = d.recognized();
            parts.push(format!("Columnas reconocidas {}/{}", found, total));
        }
        if let Some(status) = &self.status {
            parts.push(status.clone());
        }
        parts.join(" | ")
    }

    fn render_dashboard(&self, dashboard: &Dashboard, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Fill(1)])
            .split(area);

        Tabs::new(Tab::ALL.iter().map(|t| t.title()).collect::<Vec<_>>())
            .style(Style::default().fg(self.color("text_secondary")))
            .highlight_style(
                Style::default()
                    .fg(self.color("tab_active"))
                    .add_modifier(Modifier::REVERSED),
            )
            .select(self.tab.index())
            .render(layout[0], buf);

        let main = layout[1];
        let border = self.color("table_border");
        let text = self.color("text_primary");
        let row_limit = self.config.display.table_row_limit;
        match self.tab {
            Tab::Ranking => {
                let series = dashboard.ranking_series(self.top_n);
                RankingChart::new(&series)
                    .title(format!(
                        "Top {} por {}",
                        self.top_n,
                        dashboard.ranking_title()
                    ))
                    .bar_color(self.color("bar"))
                    .border_color(border)
                    .text_color(text)
                    .render(main, buf);
            }
            Tab::Budget => match (
                dashboard.budget_pairs(self.config.display.compare_limit),
                dashboard.comparison_table(row_limit),
            ) {
                (Some(pairs), Some(table)) => {
                    let picked = dashboard.picked_entities().len();
                    let selection = if picked == 0 {
                        format!("primeras {}", self.config.display.compare_limit)
                    } else {
                        format!("{} elegidas", picked)
                    };
                    let hint = match dashboard.entity_cursor() {
                        Some(name) => format!("[{}] {}", name, selection),
                        None => selection,
                    };
                    BudgetComparison::new(&pairs, &table)
                        .picker_hint(hint)
                        .colors(self.color("bar"), self.color("bar_secondary"))
                        .border_color(border)
                        .header_color(self.color("table_header"))
                        .render(main, buf);
                }
                _ => render_info(
                    "No se detectaron columnas identificables como PIA y PIM. Revisa los encabezados del archivo.",
                    self.color("warning"),
                    main,
                    buf,
                ),
            },
            Tab::Efficiency => match dashboard.efficiency_groups() {
                Some(groups) => {
                    let aug = dashboard.augmented();
                    EfficiencyChart::new(&groups)
                        .axis_titles(
                            aug.column(Role::ModifiedBudget).unwrap_or("PIM"),
                            aug.column(Role::ExecutionPercent).unwrap_or("Avance %"),
                        )
                        .palette(
                            ["scatter_point", "bar", "bar_secondary", "warning", "primary"]
                                .into_iter()
                                .map(|name| self.color(name))
                                .collect(),
                        )
                        .border_color(border)
                        .text_color(text)
                        .render(main, buf);
                }
                None => render_info(
                    "Faltan columnas para construir la comparación (Avance % y/o PIM).",
                    self.color("warning"),
                    main,
                    buf,
                ),
            },
            Tab::Explore => {
                let table = dashboard.exploratory_table(row_limit);
                TableView::new(&table)
                    .title("Tabla exploratoria")
                    .border_color(border)
                    .header_color(self.color("table_header"))
                    .render(main, buf);
            }
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let mut constraints = vec![
            Constraint::Fill(1),
            Constraint::Length(1), // Status
            Constraint::Length(1), // Controls
        ];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);
        let main_area = layout[0];

        if let Some(message) = &self.loading {
            render_info(message, self.color("primary"), main_area, buf);
        } else if let Some(dashboard) = &self.dashboard {
            self.render_dashboard(dashboard, main_area, buf);
        } else if let Some(no_data) = &self.no_data {
            NoDataScreen {
                message: &no_data.message,
                tried: &no_data.tried,
                listing: &no_data.listing,
                prompt: self.prompt.as_deref(),
                error_color: self.color("error"),
                border_color: self.color("table_border"),
                dimmed_color: self.color("dimmed"),
            }
            .render(main_area, buf);
        } else {
            Block::default().render(main_area, buf);
        }

        if self.dashboard.is_some() && self.loading.is_none() {
            if let Some(input) = &self.prompt {
                let prompt_area = Rect {
                    y: main_area.bottom().saturating_sub(1),
                    height: 1.min(main_area.height),
                    ..main_area
                };
                Paragraph::new(format!("Abrir: {}▏", input))
                    .style(Style::default().fg(self.color("primary")))
                    .render(prompt_area, buf);
            }
        }

        if self.show_help {
            GlossaryOverlay {
                term_color: self.color("primary"),
                border_color: self.color("table_border"),
            }
            .render(main_area, buf);
        }

        Paragraph::new(self.status_line())
            .style(Style::default().fg(self.color("text_secondary")))
            .render(layout[1], buf);

        let controls = if self.prompt.is_some() {
            Controls::prompt()
        } else if let Some(d) = &self.dashboard {
            Controls::with_row_count(d.view().height())
        } else {
            Controls::no_data()
        };
        controls
            .with_dimmed(self.show_help)
            .with_bg(self.color("controls_bg"))
            .render(layout[2], buf);

        if self.debug.enabled && layout.len() > 3 {
            (&self.debug).render(layout[3], buf);
        }
    }
}

/// Load, filter and export without starting the terminal UI. Returns the path written.
pub fn run_export(args: &Args, config: &AppConfig, output: &Path) -> Result<PathBuf> {
    let mut load_options = LoadOptions::default();
    if let Some(sheet) = &config.data.sheet {
        load_options = load_options.with_sheet(sheet.clone());
    }
    let paths = match &args.path {
        Some(path) => vec![path.clone()],
        None => config.data.default_paths.clone(),
    };
    let mut cache = TableCache::new();
    let (table, source) = load_first_available(&paths, &load_options, &mut cache)?;

    let mut dashboard = Dashboard::new(source, &table, &config.pipeline_options());
    if let Some(value) = &args.type_filter {
        if !dashboard.select_filter(value) {
            return Err(eyre!(
                "Type filter '{}' not found. Available: {}",
                value,
                dashboard.filter_options().join(", ")
            ));
        }
    }
    export_table(dashboard.view(), output, &config.export_options())
}
