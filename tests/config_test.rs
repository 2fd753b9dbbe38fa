use budgetui::config::{AppConfig, ConfigManager};
use budgetui::{CompressionFormat, Role};
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

fn write_user_config(manager: &ConfigManager, content: &str) {
    manager.ensure_config_dir().unwrap();
    fs::write(manager.config_path("config.toml"), content).unwrap();
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");
    assert_eq!(config.data.default_paths.len(), 2);
    assert!(config.data.sheet.is_none());
    assert!(config.roles.is_empty());

    assert_eq!(config.scale.sample_size, 30);
    assert!((config.scale.fraction_threshold - 0.7).abs() < f64::EPSILON);

    assert_eq!(config.display.top_n, 15);
    assert_eq!(config.display.top_n_min, 5);
    assert_eq!(config.display.top_n_max, 50);

    assert_eq!(config.export.delimiter, b',');
    assert!(config.export.include_header);
    assert_eq!(config.export.file_name, "ppr0101_filtrado.csv");
    assert!(config.export.compression.is_none());

    assert_eq!(config.performance.event_poll_interval_ms, 25);
    assert_eq!(config.theme.color_mode, "auto");
    assert!(!config.debug.enabled);
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let template = config_manager.generate_default_config();

    assert!(template.contains("[data]"));
    assert!(template.contains("[roles]"));
    assert!(template.contains("[scale]"));
    assert!(template.contains("[display]"));
    assert!(template.contains("[export]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[debug]"));
}

#[test]
fn test_default_template_matches_defaults() {
    let config: AppConfig = toml::from_str(
        &ConfigManager::with_dir(std::env::temp_dir()).generate_default_config(),
    )
    .expect("template parses");
    assert!(config.validate().is_ok());

    let defaults = AppConfig::default();
    assert_eq!(config.data.default_paths, defaults.data.default_paths);
    assert_eq!(config.display.top_n, defaults.display.top_n);
    assert_eq!(config.export.delimiter, defaults.export.delimiter);
    assert_eq!(config.theme.colors.bar, defaults.theme.colors.bar);
}

#[test]
fn test_write_default_config_requires_force() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let path = config_manager.write_default_config(false).unwrap();
    assert!(path.exists());

    let err = config_manager.write_default_config(false).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert!(err.to_string().contains("--force"));

    fs::write(&path, "# edited").unwrap();
    config_manager.write_default_config(true).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("[theme.colors]"));
}

#[test]
fn test_load_without_file_gives_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = config_manager.load().unwrap();
    assert_eq!(config.display.top_n, 15);
}

#[test]
fn test_user_config_merges_over_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(
        &config_manager,
        r##"
[data]
default_paths = ["presupuesto.xlsx"]
sheet = "Hoja2"

[roles]
population = ["habitantes"]

[display]
top_n = 20

[export]
delimiter = 59
compression = "gzip"

[theme.colors]
bar = "#00ff00"
"##,
    );

    let config = config_manager.load().unwrap();
    assert_eq!(config.data.default_paths.len(), 1);
    assert_eq!(config.data.sheet.as_deref(), Some("Hoja2"));
    assert_eq!(config.display.top_n, 20);
    // Untouched values keep their defaults
    assert_eq!(config.display.top_n_max, 50);
    assert_eq!(config.theme.colors.scatter_point, "green");
    assert_eq!(config.theme.colors.bar, "#00ff00");

    let aliases = config.role_aliases();
    assert_eq!(aliases.get(Role::Population), ["habitantes"]);
    assert_eq!(aliases.get(Role::InitialBudget)[0], "pia");

    let export = config.export_options();
    assert_eq!(export.delimiter, b';');
    assert_eq!(export.compression, Some(CompressionFormat::Gzip));
}

#[test]
fn test_narrowed_top_n_range_clamps_default() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[display]\ntop_n_max = 10");
    let config = config_manager.load().unwrap();
    assert_eq!(config.display.top_n, 10);
    assert_eq!(config.display.top_n_max, 10);

    write_user_config(&config_manager, "[display]\ntop_n_min = 20");
    let config = config_manager.load().unwrap();
    assert_eq!(config.display.top_n, 20);
}

#[test]
fn test_explicit_top_n_outside_range_is_rejected() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[display]\ntop_n = 12\ntop_n_max = 10");
    let err = config_manager.load().unwrap_err();
    assert!(err.to_string().contains("top_n must be between 5 and 10, got 12"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let cases = [
        ("version = \"0.2\"", "Unsupported config version"),
        ("[roles]\npresupuesto = [\"x\"]", "Unknown role 'presupuesto'"),
        ("[scale]\nfraction_threshold = 1.5", "fraction_threshold"),
        ("[scale]\nsample_size = 0", "sample_size"),
        ("[display]\ntop_n = 100", "top_n must be between"),
        ("[export]\ncompression = \"rar\"", "Invalid export compression"),
        ("[theme]\ncolor_mode = \"neon\"", "Invalid color_mode"),
        ("[theme.colors]\nbar = \"not_a_color\"", "Invalid color value for 'bar'"),
    ];

    for (content, expected) in cases {
        let (_temp_dir, config_manager) = setup_test_config_dir();
        write_user_config(&config_manager, content);
        let err = config_manager
            .load()
            .expect_err(&format!("config should be rejected: {}", content));
        assert!(
            err.to_string().contains(expected),
            "expected '{}' in '{}'",
            expected,
            err
        );
    }
}

#[test]
fn test_malformed_toml_reports_path() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[display\ntop_n = ");
    let err = config_manager.load().unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    assert!(err.to_string().contains("config.toml"));
}
