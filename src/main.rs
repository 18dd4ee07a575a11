//! pomoclock - a Pomodoro timer for the terminal and the tray
//!
//! `pomoclock run` keeps the timer in the foreground:
//! - 25 minutes of Work, 5 minutes of Break, repeated
//! - a terminal label and a floating block-digit overlay
//! - a tray icon with a progress ring (macOS)
//!
//! Every other subcommand controls the running timer over a Unix socket,
//! except `session export` and `config show`, which read the data directory.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Local};
use clap::{CommandFactory, Parser};
use tokio::net::UnixStream;
use tokio::sync::mpsc;

use pomoclock::cli::{
    Cli, Commands, ConfigCommand, Display, ExportArgs, IpcClient, RunArgs, SessionCommand,
};
use pomoclock::config::{self, SettingsStore};
use pomoclock::daemon::{
    App, IpcServer, KeyInput, Scheduler, TokioScheduler, TransitionEffects,
};
use pomoclock::lock::CommandScreenLocker;
use pomoclock::menubar::TrayIconManager;
use pomoclock::notification::DesktopNotifier;
use pomoclock::session::{default_export_file_name, export_range, SessionLog};
use pomoclock::sound::{try_create_player, AlertCue, AlertSounds};
use pomoclock::view::{LabelView, OverlayView};

/// Length of the default export range in days.
const DEFAULT_EXPORT_DAYS: i64 = 7;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so stdout stays free for the terminal views.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => run(args).await?,
        Some(Commands::Start) => Display::show_success(&IpcClient::new()?.start().await?),
        Some(Commands::Pause) => Display::show_success(&IpcClient::new()?.pause().await?),
        Some(Commands::Reset) => Display::show_success(&IpcClient::new()?.reset().await?),
        Some(Commands::Status) => Display::show_status(&IpcClient::new()?.status().await?),
        Some(Commands::Settings(args)) => {
            Display::show_success(&IpcClient::new()?.settings(&args).await?)
        }
        Some(Commands::Palette) => Display::show_success(&IpcClient::new()?.palette().await?),
        Some(Commands::AutoLock { state }) => {
            Display::show_success(&IpcClient::new()?.auto_lock(state.is_on()).await?)
        }
        Some(Commands::Volume { percent }) => {
            Display::show_success(&IpcClient::new()?.volume(percent).await?)
        }
        Some(Commands::Overlay { action }) => {
            Display::show_success(&IpcClient::new()?.overlay(&action).await?)
        }
        Some(Commands::Session { action }) => match action {
            SessionCommand::Save { label } => {
                Display::show_success(&IpcClient::new()?.session(&label).await?)
            }
            SessionCommand::Export(args) => export_sessions(args),
        },
        Some(Commands::Config { action }) => match action {
            ConfigCommand::Show => show_config()?,
        },
        Some(Commands::Quit) => Display::show_success(&IpcClient::new()?.quit().await?),
        Some(Commands::Completions { shell }) => generate_completions(shell),
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Runs the timer in the foreground until quit.
async fn run(args: RunArgs) -> Result<()> {
    let data_dir = config::data_dir()?;
    let socket_path = data_dir.join(config::SOCKET_FILE);
    ensure_not_running(&socket_path).await?;

    let store = SettingsStore::in_dir(&data_dir);
    let settings = store.load();
    let session_log = SessionLog::new(data_dir.join(config::SESSION_LOG_FILE));
    let server = IpcServer::new(&socket_path)?;

    let (cue_tx, cue_rx) = mpsc::unbounded_channel();
    let scheduler: Arc<dyn Scheduler<AlertCue>> = Arc::new(TokioScheduler::new(cue_tx));
    let effects = TransitionEffects::new(
        scheduler,
        DesktopNotifier::new(),
        CommandScreenLocker::platform_default(),
    );

    let (tray_tx, tray_rx) = crossbeam_channel::unbounded();
    let mut tray = TrayIconManager::new(tray_rx);
    let tray = match tray.initialize() {
        Ok(()) => Some(tray),
        Err(e) => {
            tracing::warn!("Tray icon unavailable: {:#}", e);
            None
        }
    };

    let mut app = App::new(settings, store, session_log, effects)
        .with_view(LabelView::stdout())
        .with_view(OverlayView::stdout());
    if tray.is_some() {
        app = app.with_tray(tray_tx);
    }

    if args.overlay {
        app.engine().lock().await.toggle_overlay()?;
    }

    if std::io::stdin().is_terminal() {
        match KeyInput::open() {
            Ok(keys) => app = app.with_keyboard(keys),
            Err(e) => tracing::warn!("Keyboard shortcuts unavailable: {}", e),
        }
    }

    let player = try_create_player(args.no_sound);
    app.run(server, cue_rx, player, AlertSounds::discover(), tray)
        .await
}

/// Fails if another instance already answers on `socket_path`.
async fn ensure_not_running(socket_path: &std::path::Path) -> Result<()> {
    if UnixStream::connect(socket_path).await.is_ok() {
        anyhow::bail!(
            "pomoclock is already running (socket {})",
            socket_path.display()
        );
    }
    Ok(())
}

/// Exports session themes. Failures are reported but never fail the command.
fn export_sessions(args: ExportArgs) {
    let now = Local::now();
    let to = args.to.unwrap_or(now);
    let from = args
        .from
        .unwrap_or_else(|| to - Duration::days(DEFAULT_EXPORT_DAYS));
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_export_file_name(now)));

    let result = config::session_log_path()
        .context("Failed to locate the session log")
        .and_then(|path| {
            export_range(&SessionLog::new(path), from, to, &output)
                .map_err(|e| anyhow::anyhow!("{}. {}", e, e.suggestion()))
        });

    match result {
        Ok(count) => Display::show_export_success(count, &output),
        Err(e) => {
            tracing::warn!("Session export failed: {:#}", e);
            Display::show_warning(&format!("Session export failed: {:#}", e));
        }
    }
}

/// Prints the stored settings without contacting the running timer.
fn show_config() -> Result<()> {
    let store = SettingsStore::default_location()?;
    let session_log = config::session_log_path()?;
    Display::show_config(&store.load(), store.path(), &session_log);
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
