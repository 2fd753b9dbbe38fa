use clap::ValueEnum;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::export::ExportOptions;
use crate::pipeline::PipelineOptions;
use crate::roles::{Role, RoleAliases};
use crate::scale::{ScaleOptions, DEFAULT_FRACTION_THRESHOLD, DEFAULT_SAMPLE_SIZE};
use crate::{Args, CompressionFormat};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Load `config.toml` from this directory merged over the defaults.
    pub fn load(&self) -> Result<AppConfig> {
        let mut config = AppConfig::default();
        let config_path = self.config_path("config.toml");
        if config_path.exists() {
            config.merge(AppConfig::from_file(&config_path)?);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub data: DataConfig,
    /// Alias overrides keyed by role name (`initial_budget`, `population`, ...)
    pub roles: BTreeMap<String, Vec<String>>,
    pub scale: ScaleConfig,
    pub display: DisplayConfig,
    pub export: ExportConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Tried in order when no path is given on the command line
    pub default_paths: Vec<PathBuf>,
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub sample_size: usize,
    pub fraction_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub top_n: usize,
    pub top_n_min: usize,
    pub top_n_max: usize,
    pub table_row_limit: usize,
    pub compare_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub delimiter: u8,
    pub include_header: bool,
    pub file_name: String,
    pub compression: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub color_mode: String,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub success: String,
    pub error: String,
    pub warning: String,
    pub dimmed: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub table_header: String,
    pub table_border: String,
    pub tab_active: String,
    pub bar: String,
    pub bar_secondary: String,
    pub scatter_point: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            data: DataConfig::default(),
            roles: BTreeMap::new(),
            scale: ScaleConfig::default(),
            display: DisplayConfig::default(),
            export: ExportConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            default_paths: vec![
                PathBuf::from("data/PPR 0101-2021.xlsx"),
                PathBuf::from("PPR 0101-2021.xlsx"),
            ],
            sheet: None,
        }
    }
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            fraction_threshold: DEFAULT_FRACTION_THRESHOLD,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top_n: 15,
            top_n_min: 5,
            top_n_max: 50,
            table_row_limit: 1000,
            compare_limit: 15,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            include_header: true,
            file_name: "ppr0101_filtrado.csv".to_string(),
            compression: None,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: "auto".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "yellow".to_string(),
            success: "green".to_string(),
            error: "red".to_string(),
            warning: "yellow".to_string(),
            dimmed: "dark_gray".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "dark_gray".to_string(),
            table_header: "white".to_string(),
            table_border: "cyan".to_string(),
            tab_active: "yellow".to_string(),
            bar: "cyan".to_string(),
            bar_secondary: "magenta".to_string(),
            scatter_point: "green".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_file: "budgetui.log".to_string(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        match ConfigManager::new(app_name) {
            Ok(manager) => manager.load(),
            Err(_) => {
                let config = AppConfig::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read config file at {}: {}", path.display(), e))?;

        toml::from_str(&content)
            .map_err(|e| eyre!("Failed to parse config file at {}: {}", path.display(), e))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.data.merge(other.data);
        self.roles.extend(other.roles);
        self.scale.merge(other.scale);
        self.display.merge(other.display);
        self.export.merge(other.export);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        for name in self.roles.keys() {
            if Role::from_name(name).is_none() {
                let known: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
                return Err(eyre!(
                    "Unknown role '{}' in [roles]. Known roles: {}",
                    name,
                    known.join(", ")
                ));
            }
        }

        if self.scale.sample_size == 0 {
            return Err(eyre!("sample_size must be greater than 0"));
        }
        if !(0.0..1.0).contains(&self.scale.fraction_threshold) {
            return Err(eyre!(
                "fraction_threshold must be in [0, 1), got {}",
                self.scale.fraction_threshold
            ));
        }

        let d = &self.display;
        if d.top_n_min == 0 || d.top_n_min > d.top_n_max {
            return Err(eyre!(
                "top_n_min must be between 1 and top_n_max ({}), got {}",
                d.top_n_max,
                d.top_n_min
            ));
        }
        if d.top_n < d.top_n_min || d.top_n > d.top_n_max {
            return Err(eyre!(
                "top_n must be between {} and {}, got {}",
                d.top_n_min,
                d.top_n_max,
                d.top_n
            ));
        }

        if let Some(name) = &self.export.compression {
            if CompressionFormat::from_str(name, true).is_err() {
                return Err(eyre!(
                    "Invalid export compression: {}. Must be gzip, zstd, bzip2 or xz",
                    name
                ));
            }
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        match self.theme.color_mode.as_str() {
            "light" | "dark" | "auto" => {}
            _ => {
                return Err(eyre!(
                    "Invalid color_mode: {}. Must be 'light', 'dark', or 'auto'",
                    self.theme.color_mode
                ))
            }
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }

    /// Apply command-line overrides. `--top-n` is clamped to the configured range.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(sheet) = &args.sheet {
            self.data.sheet = Some(sheet.clone());
        }
        if let Some(top_n) = args.top_n {
            self.display.top_n = top_n.clamp(self.display.top_n_min, self.display.top_n_max);
        }
        if let Some(delimiter) = args.delimiter {
            self.export.delimiter = delimiter;
        }
        if let Some(compression) = args.compression {
            self.export.compression = compression
                .to_possible_value()
                .map(|v| v.get_name().to_string());
        }
        if args.debug {
            self.debug.enabled = true;
        }
    }

    /// Default aliases with the `[roles]` overrides applied. Unknown role names are skipped.
    pub fn role_aliases(&self) -> RoleAliases {
        self.roles
            .iter()
            .filter_map(|(name, aliases)| Role::from_name(name).map(|r| (r, aliases.clone())))
            .fold(RoleAliases::default(), |acc, (role, aliases)| {
                acc.with_role(role, aliases)
            })
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            aliases: self.role_aliases(),
            scale: ScaleOptions {
                sample_size: self.scale.sample_size,
                fraction_threshold: self.scale.fraction_threshold,
            },
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            delimiter: self.export.delimiter,
            include_header: self.export.include_header,
            compression: self
                .export
                .compression
                .as_deref()
                .and_then(|c| CompressionFormat::from_str(c, true).ok()),
        }
    }
}

// Merge implementations for each config section
impl DataConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DataConfig::default();
        if other.default_paths != default.default_paths {
            self.default_paths = other.default_paths;
        }
        if other.sheet.is_some() {
            self.sheet = other.sheet;
        }
    }
}

impl ScaleConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ScaleConfig::default();
        if other.sample_size != default.sample_size {
            self.sample_size = other.sample_size;
        }
        if other.fraction_threshold != default.fraction_threshold {
            self.fraction_threshold = other.fraction_threshold;
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.top_n != default.top_n {
            self.top_n = other.top_n;
        }
        if other.top_n_min != default.top_n_min {
            self.top_n_min = other.top_n_min;
        }
        if other.top_n_max != default.top_n_max {
            self.top_n_max = other.top_n_max;
        }
        if other.table_row_limit != default.table_row_limit {
            self.table_row_limit = other.table_row_limit;
        }
        if other.compare_limit != default.compare_limit {
            self.compare_limit = other.compare_limit;
        }
        // An inherited top_n follows the new range; an explicit one is validated as given.
        if other.top_n == default.top_n && self.top_n_min <= self.top_n_max {
            self.top_n = self.top_n.clamp(self.top_n_min, self.top_n_max);
        }
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ExportConfig::default();
        if other.delimiter != default.delimiter {
            self.delimiter = other.delimiter;
        }
        if other.include_header != default.include_header {
            self.include_header = other.include_header;
        }
        if other.file_name != default.file_name {
            self.file_name = other.file_name;
        }
        if other.compression.is_some() {
            self.compression = other.compression;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ThemeConfig::default();
        if other.color_mode != default.color_mode {
            self.color_mode = other.color_mode;
        }
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    fn fields(&self) -> [(&'static str, &String); 15] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("success", &self.success),
            ("error", &self.error),
            ("warning", &self.warning),
            ("dimmed", &self.dimmed),
            ("controls_bg", &self.controls_bg),
            ("text_primary", &self.text_primary),
            ("text_secondary", &self.text_secondary),
            ("table_header", &self.table_header),
            ("table_border", &self.table_border),
            ("tab_active", &self.tab_active),
            ("bar", &self.bar),
            ("bar_secondary", &self.bar_secondary),
            ("scatter_point", &self.scatter_point),
        ]
    }

    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.fields() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();

        macro_rules! merge_color {
            ($($field:ident),*) => {
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )*
            };
        }

        merge_color!(
            primary,
            secondary,
            success,
            error,
            warning,
            dimmed,
            controls_bg,
            text_primary,
            text_secondary,
            table_header,
            table_border,
            tab_active,
            bar,
            bar_secondary,
            scatter_point
        );
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DebugConfig::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
        if other.log_file != default.log_file {
            self.log_file = other.log_file;
        }
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parse a color string (hex or named) and convert to appropriate terminal color
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();

        // Hex format: "#ff0000" or "#FF0000" (6-character hex)
        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(self.convert_rgb_to_terminal_color(r, g, b));
        }

        // Indexed colors: "indexed(236)" for explicit 256-color palette
        if trimmed.to_lowercase().starts_with("indexed(") && trimmed.ends_with(')') {
            let num_str = &trimmed[8..trimmed.len() - 1];
            let num = num_str.parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),

            "bright_black" | "bright black" => Ok(Color::Indexed(8)),
            "bright_red" | "bright red" => Ok(Color::Indexed(9)),
            "bright_green" | "bright green" => Ok(Color::Indexed(10)),
            "bright_yellow" | "bright yellow" => Ok(Color::Indexed(11)),
            "bright_blue" | "bright blue" => Ok(Color::Indexed(12)),
            "bright_magenta" | "bright magenta" => Ok(Color::Indexed(13)),
            "bright_cyan" | "bright cyan" => Ok(Color::Indexed(14)),
            "bright_white" | "bright white" => Ok(Color::Indexed(15)),

            "gray" | "grey" => Ok(Color::Indexed(8)),
            "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => Ok(Color::Indexed(8)),
            "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Indexed(7)),

            "reset" | "reversed" => Ok(Color::Reset),

            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 bright variants (bright_red, etc.), or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    /// Convert RGB values to appropriate terminal color based on capabilities
    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse hex color string (#ff0000) to RGB components
fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let r = u8::from_str_radix(&s[1..3], 16)
        .map_err(|_| eyre!("Invalid red component in hex color: {}", s))?;
    let g = u8::from_str_radix(&s[3..5], 16)
        .map_err(|_| eyre!("Invalid green component in hex color: {}", s))?;
    let b = u8::from_str_radix(&s[5..7], 16)
        .map_err(|_| eyre!("Invalid blue component in hex color: {}", s))?;

    Ok((r, g, b))
}

/// Convert RGB to nearest 256-color palette index (xterm palette)
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        for (name, value) in config.colors.fields() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    /// Get a color by name, returns None if not found
    pub fn get_optional(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Theme {
            colors: HashMap::new(),
        })
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
