//! `Taskdeck`: terminal task manager.
//!
//! Launches the TUI against a REST task store, or against a built-in
//! in-memory store with `--offline`. Configuration via CLI flags,
//! environment variables, or config file (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! # Talk to a task store on localhost:5000
//! cargo run --bin taskdeck
//!
//! # Another store, pending tasks only
//! cargo run --bin taskdeck -- --api-url http://tasks.internal:8080 --filter pending
//!
//! # No network
//! cargo run --bin taskdeck -- --offline
//! ```

use std::io;
use std::path::Path;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::{mpsc, watch};
use tracing_appender::non_blocking::WorkerGuard;

use taskdeck::app::App;
use taskdeck::config::{CliArgs, ClientConfig};
use taskdeck::store::TaskStore;
use taskdeck::store::http::HttpTaskStore;
use taskdeck::store::memory::MemoryTaskStore;
use taskdeck::sync::{SyncSnapshot, Synchronizer};
use taskdeck::ui;
use taskdeck::worker::{self, SyncCommand};

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load configuration: {e}");
            ClientConfig::fallback(&cli)
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(api_url = %config.api_url, offline = config.offline, "taskdeck starting");

    // Build the store and start the worker before touching the terminal so
    // a bad URL is reported on a normal screen.
    let (cmd_tx, snapshots, store_label) = if config.offline {
        start_worker(MemoryTaskStore::demo(), &config)
    } else {
        let store = HttpTaskStore::new(&config.api_url, config.request_timeout)
            .map_err(io::Error::other)?;
        start_worker(store, &config)
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store_label, config.timestamp_format.clone());
    let result = run_app(&mut terminal, &mut app, &cmd_tx, snapshots, &config);

    // Stop the worker; a full queue or a dead worker is fine at this point.
    let _ = cmd_tx.try_send(SyncCommand::Shutdown);

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskdeck exiting");
    result
}

/// Wrap `store` in a synchronizer and spawn the worker for it.
fn start_worker<S: TaskStore + 'static>(
    store: S,
    config: &ClientConfig,
) -> (
    mpsc::Sender<SyncCommand>,
    watch::Receiver<SyncSnapshot>,
    String,
) {
    let label = store.endpoint();
    let sync = Synchronizer::new(store).with_selection(config.selection);
    let (tx, rx, _handle) = worker::spawn_sync(sync, config.channel_capacity);
    (tx, rx, label)
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdeck.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
///
/// Runs on the runtime's main thread; `event::poll` blocks for at most
/// `poll_timeout`, and the worker makes progress on the other threads.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    cmd_tx: &mpsc::Sender<SyncCommand>,
    mut snapshots: watch::Receiver<SyncSnapshot>,
    config: &ClientConfig,
) -> io::Result<()> {
    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Step 2: Pick up the latest published state (non-blocking).
        if snapshots.has_changed().unwrap_or(false) {
            let snapshot = snapshots.borrow_and_update().clone();
            app.apply_snapshot(snapshot);
        }

        // Step 3: Advance the loading spinner.
        app.tick();

        // Step 4: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if let Some(command) = app.handle_key_event(key) {
                match cmd_tx.try_send(command) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(command)) => {
                        tracing::warn!(?command, "command dropped, worker busy");
                    }
                    Err(mpsc::error::TrySendError::Closed(command)) => {
                        tracing::error!(?command, "command dropped, worker stopped");
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
