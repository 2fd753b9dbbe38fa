use budgetui::{App, AppConfig, AppEvent, Args, DataSource, Theme};
use clap::Parser;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::{error, info};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let theme = Theme::from_config(&config.theme)?;
    let mut app = App::new_with_config(theme, config).with_type_filter(args.type_filter.clone());
    if args.debug {
        app.enable_debug();
    }
    render(&mut terminal, &mut app)?;
    tx.send(match &args.path {
        Some(path) => AppEvent::Open(DataSource::path(path.clone())),
        None => AppEvent::OpenDefault,
    })?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match budgetui::CacheManager::new(budgetui::APP_NAME) {
            Ok(cache) => {
                if let Err(e) = cache.clear_all() {
                    eprintln!("Error clearing cache: {}", e);
                    std::process::exit(1);
                }
                println!("Cache cleared successfully");
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    if args.generate_config {
        match budgetui::ConfigManager::new(budgetui::APP_NAME) {
            Ok(manager) => match manager.write_default_config(args.force) {
                Ok(path) => {
                    println!("Configuration written to {}", path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing config: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let mut config = AppConfig::load(budgetui::APP_NAME)?;
    config.apply_args(&args);

    if let Ok(cache) = budgetui::CacheManager::new(budgetui::APP_NAME) {
        if let Err(e) =
            budgetui::logging::init_logging(&cache, &config.debug.log_file, config.debug.enabled)
        {
            eprintln!("Warning: {}", e);
        }
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    if let Some(output) = &args.export {
        let written = budgetui::run_export(&args, &config, output)?;
        println!("Exported to {}", written.display());
        return Ok(());
    }

    let terminal = ratatui::init();
    let result = run(terminal, &args, config);
    ratatui::restore();
    if let Err(e) = result {
        error!(error = %e, "exiting with error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
