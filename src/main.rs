use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use f2b_console::app::App;
use f2b_console::services::api_client::HttpBackend;
use f2b_console::services::preferences::FilePreferences;
use f2b_console::utils::config::Config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Management endpoint URL (overrides the configuration file)
    #[arg(short, long)]
    endpoint: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())
        .and_then(|config| config.with_endpoint(cli.endpoint.clone()))
        .context("Invalid configuration")?;

    init_logging(cli.debug, config.log_file.as_deref());
    log::info!(
        "Starting f2b-console v{} against {}",
        env!("CARGO_PKG_VERSION"),
        config.endpoint
    );

    let backend = Arc::new(
        HttpBackend::new(&config.endpoint, config.request_timeout())
            .context("Failed to create HTTP client")?,
    );
    let preferences = Box::new(FilePreferences::open(&config.preferences_path()));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend_ui = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_ui)?;

    // Create app and run
    let app = App::new(config, backend, preferences);
    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("Application error: {:#}", err);
        eprintln!("Application error: {}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Log to a file so output does not interfere with the TUI.
fn init_logging(debug: bool, configured: Option<&std::path::Path>) {
    let log_level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Try the configured file first, then the usual locations
    let mut log_paths: Vec<PathBuf> = Vec::new();
    if let Some(path) = configured {
        log_paths.push(path.to_path_buf());
    }
    log_paths.push(PathBuf::from("/tmp/f2b-console.log"));
    log_paths.push(PathBuf::from("./f2b-console.log"));

    let log_file = log_paths.iter().find_map(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    match log_file {
        Some(file) => {
            env_logger::Builder::from_default_env()
                .filter_level(log_level)
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        None => {
            // Fall back to stderr if no log file can be created
            env_logger::Builder::from_default_env()
                .filter_level(log_level)
                .init();
        }
    }
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if app.handle_events()? {
            break;
        }
    }

    Ok(())
}
