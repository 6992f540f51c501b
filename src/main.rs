mod api;
mod app;
mod config;
mod events;
mod exchange;
mod models;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::*};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use api::{GameClient, PlayBackend};
use app::App;
use events::AppEvent;
use exchange::Session;
use ui::Theme;

#[derive(Parser, Debug)]
#[command(name = "storychat", version, about = "Play the story game from your terminal")]
struct Cli {
    /// Story server base URL (overrides the config file)
    #[arg(long)]
    server: Option<String>,
    /// Path to an alternate config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seconds to wait for a reply before giving up
    #[arg(long)]
    timeout: Option<u64>,
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if cli.timeout.is_some() {
        config.request_timeout = cli.timeout;
    }

    let log_path = match &config.log_file {
        Some(path) => path.clone(),
        None => config::default_log_path()?,
    };
    init_logging(&log_path, cli.verbose)?;
    info!(server = %config.server_url, timeout = ?config.request_timeout, "starting storychat");

    let client: Arc<dyn PlayBackend> =
        Arc::new(GameClient::new(&config.server_url, config.request_timeout)?);
    let theme = Theme::from_config(&config.theme);
    let mut app = App::new(config.server_url.clone());
    let mut session = Session::default();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    let res = run_app(
        &mut terminal,
        &mut app,
        &mut session,
        &theme,
        &client,
        &tx,
        &mut rx,
    );

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    info!("storychat exited");
    Ok(())
}

/// The terminal belongs to the UI, so diagnostics go to a log file.
fn init_logging(log_path: &Path, verbose: bool) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("storychat={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn handle_app_event(app: &mut App, session: &mut Session, event: AppEvent) {
    match event {
        AppEvent::ExchangeFinished(outcome) => {
            session.finish(app, outcome);
            app.scroll_to_bottom();
        }
    }
}

const fn handle_help_keys(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> bool {
    if !app.show_help {
        return false;
    }

    match key {
        KeyCode::Char('h') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.toggle_help();
        }
        KeyCode::Esc => {
            app.show_help = false;
        }
        _ => {}
    }
    true
}

fn handle_keyboard_input(
    app: &mut App,
    session: &mut Session,
    key: KeyCode,
    modifiers: KeyModifiers,
    client: &Arc<dyn PlayBackend>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match key {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            if app.exit_pending {
                app.quit();
            } else {
                app.exit_pending = true;
            }
            return;
        }
        KeyCode::Esc if app.exit_pending => {
            app.exit_pending = false;
            return;
        }
        _ if app.exit_pending => {
            // Any other key cancels pending exit and is processed normally
            app.exit_pending = false;
        }
        _ => {}
    }

    match key {
        KeyCode::Char('q') if modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Char('h') if modifiers.contains(KeyModifiers::CONTROL) => app.toggle_help(),
        KeyCode::Tab => app.toggle_focus(),

        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.scroll_to_bottom(),

        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => send_input(app, session, client, event_tx),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => app.type_char(c),

        _ => {}
    }
}

fn send_input(
    app: &mut App,
    session: &mut Session,
    client: &Arc<dyn PlayBackend>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let Some(input) = session.begin(app) else {
        return;
    };
    debug!("exchange started");

    let client = Arc::clone(client);
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let outcome = client.play(&input).await;
        let _ = tx.send(AppEvent::ExchangeFinished(outcome));
    });
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &mut Session,
    theme: &Theme,
    client: &Arc<dyn PlayBackend>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app, session.state(), theme))?;

        while let Ok(app_event) = event_rx.try_recv() {
            handle_app_event(app, session, app_event);
        }

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && !handle_help_keys(app, key.code, key.modifiers)
                {
                    handle_keyboard_input(app, session, key.code, key.modifiers, client, event_tx);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
