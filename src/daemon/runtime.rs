//! Application loop for `pomoclock run`.
//!
//! [`App`] owns the event consumer side of the timer:
//! - drives [`TimerEngine::tick`] once per second
//! - runs [`TransitionEffects`] for phase completions
//! - persists settings and session themes
//! - renders every [`View`] from a fresh snapshot
//!
//! [`App::run`] adds the live inputs (control socket, keyboard, tray menu,
//! Ctrl-C) on a single-threaded `tokio::select!` loop.

use std::sync::Arc;

use anyhow::Result;
use crossbeam_channel::Sender;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{AppSettings, SettingsStore};
use crate::lock::ScreenLocker;
use crate::menubar::{MenuAction, TrayIconManager, TrayUpdate};
use crate::notification::Notifier;
use crate::session::{SessionLog, SessionRecord};
use crate::sound::{play_cue, AlertCue, AlertSounds, SoundPlayer};
use crate::types::{TickOutcome, TimerSnapshot};
use crate::view::{TrayView, View};

use super::effects::TransitionEffects;
use super::ipc::{IpcServer, RequestHandler};
use super::keys::{next_key_action, KeyInput};
use super::timer::{TimerEngine, TimerEvent};

/// How often the tray is polled for updates and menu clicks.
const TRAY_POLL_INTERVAL_MS: u64 = 100;

// ============================================================================
// UserAction
// ============================================================================

/// Commands issued from the keyboard or the tray menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Start,
    TogglePause,
    Reset,
    ToggleOverlay,
    TogglePalette,
    Quit,
}

impl UserAction {
    /// Maps a key press in the `run` terminal to an action.
    ///
    /// Releases and repeats are ignored. Ctrl-C quits, since raw mode
    /// delivers it as a key instead of a signal.
    pub fn from_key_event(key: &KeyEvent) -> Option<UserAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(UserAction::Quit)
            }
            _ if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => None,
            KeyCode::Char(c) => Self::from_char(c),
            _ => None,
        }
    }

    /// Maps a shortcut character to an action, ignoring case.
    pub fn from_char(c: char) -> Option<UserAction> {
        match c.to_ascii_lowercase() {
            's' => Some(UserAction::Start),
            'p' => Some(UserAction::TogglePause),
            'r' => Some(UserAction::Reset),
            'o' => Some(UserAction::ToggleOverlay),
            't' => Some(UserAction::TogglePalette),
            'q' => Some(UserAction::Quit),
            _ => None,
        }
    }
}

impl From<MenuAction> for UserAction {
    fn from(action: MenuAction) -> Self {
        match action {
            MenuAction::Start => UserAction::Start,
            MenuAction::TogglePause => UserAction::TogglePause,
            MenuAction::Reset => UserAction::Reset,
            MenuAction::ToggleOverlay => UserAction::ToggleOverlay,
            MenuAction::Quit => UserAction::Quit,
        }
    }
}

// ============================================================================
// App
// ============================================================================

/// The running application.
pub struct App<N, L> {
    engine: Arc<Mutex<TimerEngine>>,
    event_rx: mpsc::UnboundedReceiver<TimerEvent>,
    effects: TransitionEffects<N, L>,
    store: SettingsStore,
    session_log: SessionLog,
    views: Vec<Box<dyn View>>,
    tray_tx: Option<Sender<TrayUpdate>>,
    keys: Option<KeyInput>,
    shutdown: Arc<Notify>,
    /// Set when the timer resumed, so the one-second ticker restarts.
    restart_ticker: bool,
}

impl<N: Notifier, L: ScreenLocker> App<N, L> {
    /// Creates the application from loaded settings.
    ///
    /// The timer starts paused at the beginning of a Work phase.
    pub fn new(
        settings: AppSettings,
        store: SettingsStore,
        session_log: SessionLog,
        effects: TransitionEffects<N, L>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let engine = TimerEngine::new(settings, event_tx);

        Self {
            engine: Arc::new(Mutex::new(engine)),
            event_rx,
            effects,
            store,
            session_log,
            views: Vec::new(),
            tray_tx: None,
            keys: None,
            shutdown: Arc::new(Notify::new()),
            restart_ticker: false,
        }
    }

    /// Adds a presentation sink.
    pub fn with_view(mut self, view: impl View + 'static) -> Self {
        self.views.push(Box::new(view));
        self
    }

    /// Adds the tray sink. The sender is also used to remove the icon on exit.
    pub fn with_tray(mut self, tx: Sender<TrayUpdate>) -> Self {
        self.views.push(Box::new(TrayView::new(tx.clone())));
        self.tray_tx = Some(tx);
        self
    }

    /// Reads single-key shortcuts from `keys` while running.
    pub fn with_keyboard(mut self, keys: KeyInput) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Returns the shared engine.
    pub fn engine(&self) -> Arc<Mutex<TimerEngine>> {
        Arc::clone(&self.engine)
    }

    /// Returns a handler for control socket connections.
    pub fn request_handler(&self) -> RequestHandler {
        RequestHandler::new(self.engine(), Arc::clone(&self.shutdown))
    }

    /// Returns the notify signalled by the quit command.
    pub fn shutdown_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Returns a snapshot of the current state.
    pub async fn snapshot(&self) -> TimerSnapshot {
        self.engine.lock().await.snapshot()
    }

    /// Advances the timer by one second and handles the resulting events.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let outcome = self.engine.lock().await.tick()?;
        self.process_events().await;
        Ok(outcome)
    }

    /// Applies a keyboard or tray command.
    ///
    /// Returns `false` when the application should exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel is closed.
    pub async fn apply(&mut self, action: UserAction) -> Result<bool> {
        debug!(?action, "User action");
        {
            let mut engine = self.engine.lock().await;
            match action {
                UserAction::Start => {
                    engine.start()?;
                }
                UserAction::TogglePause => engine.toggle_pause()?,
                UserAction::Reset => engine.reset()?,
                UserAction::ToggleOverlay => {
                    engine.toggle_overlay()?;
                }
                UserAction::TogglePalette => {
                    engine.toggle_palette()?;
                }
                UserAction::Quit => return Ok(false),
            }
        }
        self.process_events().await;
        Ok(true)
    }

    /// Handles every queued engine event. Returns how many were handled.
    pub async fn process_events(&mut self) -> usize {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        self.dispatch(events).await
    }

    async fn dispatch(&mut self, events: Vec<TimerEvent>) -> usize {
        if events.is_empty() {
            return 0;
        }

        let snapshot = self.snapshot().await;
        let mut settings_changed = false;

        for event in &events {
            self.effects.on_event(event, &snapshot).await;
            settings_changed |= event.changes_settings();
            // A resumed countdown gets a full second before its next tick
            self.restart_ticker |= matches!(event, TimerEvent::Started);

            if let TimerEvent::SessionThemeChanged { label: Some(label) } = event {
                self.record_session(label);
            }
        }

        if settings_changed {
            self.save_settings().await;
        }
        self.render(&snapshot);

        events.len()
    }

    fn record_session(&self, label: &str) {
        match self.session_log.append(&SessionRecord::now(label)) {
            Ok(true) => info!(label, "Session theme recorded"),
            Ok(false) => {}
            Err(e) => warn!("Failed to record session theme: {}. {}", e, e.suggestion()),
        }
    }

    /// Persists the current settings, logging failures.
    pub async fn save_settings(&self) {
        let settings = self.engine.lock().await.to_settings();
        if let Err(e) = self.store.save(&settings) {
            warn!("Failed to save settings: {}. {}", e, e.suggestion());
        }
    }

    /// Renders every view from `snapshot`.
    pub fn render(&mut self, snapshot: &TimerSnapshot) {
        for view in &mut self.views {
            if let Err(e) = view.render(snapshot) {
                warn!("Render failed: {:#}", e);
            }
        }
    }

    /// Runs until quit, Ctrl-C or the quit command.
    ///
    /// Alert cues scheduled by the effects arrive on `cue_rx` and are played
    /// through `player` when one is available.
    ///
    /// # Errors
    ///
    /// Returns an error if the event channel closes unexpectedly.
    pub async fn run<P: SoundPlayer>(
        mut self,
        server: IpcServer,
        mut cue_rx: mpsc::UnboundedReceiver<AlertCue>,
        player: Option<P>,
        sounds: AlertSounds,
        mut tray: Option<TrayIconManager>,
    ) -> Result<()> {
        let handler = Arc::new(self.request_handler());
        let shutdown = self.shutdown_signal();

        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately
        ticker.tick().await;

        let mut tray_poll = interval(Duration::from_millis(TRAY_POLL_INTERVAL_MS));
        tray_poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let initial = self.snapshot().await;
        self.render(&initial);
        info!(
            socket = %server.socket_path().display(),
            "Timer ready: s start, p pause, r reset, o overlay, t palette, q quit"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await?;
                }
                Some(event) = self.event_rx.recv() => {
                    let mut events = vec![event];
                    while let Ok(event) = self.event_rx.try_recv() {
                        events.push(event);
                    }
                    self.dispatch(events).await;
                }
                Some(cue) = cue_rx.recv() => {
                    if let Some(ref player) = player {
                        play_cue(player, &sounds, cue);
                    }
                }
                accepted = server.accept() => match accepted {
                    Ok(stream) => {
                        let handler = Arc::clone(&handler);
                        tokio::spawn(async move {
                            if let Err(e) = handler.handle_connection(stream).await {
                                debug!("Control connection failed: {:#}", e);
                            }
                        });
                    }
                    Err(e) => warn!("{:#}", e),
                },
                action = next_key_action(&mut self.keys) => match action {
                    Some(action) => {
                        if !self.apply(action).await? {
                            break;
                        }
                    }
                    None => {
                        debug!("Keyboard input closed; shortcuts disabled");
                        if let Some(mut keys) = self.keys.take() {
                            keys.restore();
                        }
                    }
                },
                _ = tray_poll.tick(), if tray.is_some() => {
                    let action = tray.as_mut().and_then(|tray| {
                        tray.process_pending_updates();
                        tray.poll_menu_action()
                    });
                    if let Some(action) = action {
                        if !self.apply(action.into()).await? {
                            break;
                        }
                    }
                }
                _ = shutdown.notified() => {
                    info!("Quit requested over the control socket");
                    break;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }
            }

            if std::mem::take(&mut self.restart_ticker) {
                ticker.reset();
            }
        }

        self.finish(tray.as_mut()).await;
        Ok(())
    }

    /// Restores the terminal, saves settings and removes the tray icon.
    pub async fn finish(&mut self, tray: Option<&mut TrayIconManager>) {
        if let Some(mut keys) = self.keys.take() {
            keys.restore();
        }
        self.save_settings().await;

        if let Some(ref tx) = self.tray_tx {
            let _ = tx.send(TrayUpdate::Shutdown);
        }
        if let Some(tray) = tray {
            tray.process_pending_updates();
        }
        info!("Settings saved, exiting");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::scheduler::ManualScheduler;
    use crate::lock::MockScreenLocker;
    use crate::notification::MockNotifier;
    use crate::sound::AlertSound;
    use crate::types::Phase;
    use crate::view::MockView;

    struct Fixture {
        app: App<Arc<MockNotifier>, Arc<MockScreenLocker>>,
        view: MockView,
        scheduler: Arc<ManualScheduler<AlertCue>>,
        notifier: Arc<MockNotifier>,
        locker: Arc<MockScreenLocker>,
        store: SettingsStore,
        session_log: SessionLog,
        _dir: tempfile::TempDir,
    }

    fn fixture(settings: AppSettings) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        let session_log = SessionLog::new(dir.path().join("session_themes.jsonl"));
        let scheduler = Arc::new(ManualScheduler::new());
        let notifier = Arc::new(MockNotifier::new());
        let locker = Arc::new(MockScreenLocker::new());
        let effects = TransitionEffects::new(
            scheduler.clone(),
            Arc::clone(&notifier),
            Arc::clone(&locker),
        );
        let view = MockView::new();
        let app = App::new(
            settings,
            SettingsStore::in_dir(dir.path()),
            SessionLog::new(dir.path().join("session_themes.jsonl")),
            effects,
        )
        .with_view(view.clone());

        Fixture {
            app,
            view,
            scheduler,
            notifier,
            locker,
            store,
            session_log,
            _dir: dir,
        }
    }

    fn short_settings() -> AppSettings {
        AppSettings {
            work_duration_seconds: 3,
            break_duration_seconds: 2,
            ..AppSettings::default()
        }
    }

    mod user_action_tests {
        use super::*;

        fn press(code: KeyCode) -> KeyEvent {
            KeyEvent::new(code, KeyModifiers::NONE)
        }

        #[test]
        fn test_from_key_event() {
            let action = |c| UserAction::from_key_event(&press(KeyCode::Char(c)));
            assert_eq!(action('s'), Some(UserAction::Start));
            assert_eq!(action('p'), Some(UserAction::TogglePause));
            assert_eq!(action('r'), Some(UserAction::Reset));
            assert_eq!(action('o'), Some(UserAction::ToggleOverlay));
            assert_eq!(action('t'), Some(UserAction::TogglePalette));
            assert_eq!(action('q'), Some(UserAction::Quit));
            assert_eq!(action('x'), None);
            assert_eq!(UserAction::from_key_event(&press(KeyCode::Enter)), None);
        }

        #[test]
        fn test_uppercase_key_maps_like_lowercase() {
            let key = KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT);
            assert_eq!(UserAction::from_key_event(&key), Some(UserAction::Start));
        }

        #[test]
        fn test_ctrl_c_quits() {
            let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
            assert_eq!(UserAction::from_key_event(&key), Some(UserAction::Quit));

            let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
            assert_eq!(UserAction::from_key_event(&key), None);
        }

        #[test]
        fn test_release_is_ignored() {
            let key = KeyEvent::new_with_kind(
                KeyCode::Char('s'),
                KeyModifiers::NONE,
                KeyEventKind::Release,
            );
            assert_eq!(UserAction::from_key_event(&key), None);
        }

        #[test]
        fn test_from_menu_action() {
            assert_eq!(UserAction::from(MenuAction::Reset), UserAction::Reset);
            assert_eq!(
                UserAction::from(MenuAction::ToggleOverlay),
                UserAction::ToggleOverlay
            );
        }
    }

    mod tick_tests {
        use super::*;

        #[tokio::test]
        async fn test_paused_tick_renders_nothing() {
            let mut f = fixture(short_settings());

            f.app.tick().await.unwrap();
            assert_eq!(f.view.render_count(), 0);
        }

        #[tokio::test]
        async fn test_each_tick_renders() {
            let mut f = fixture(short_settings());
            f.app.apply(UserAction::Start).await.unwrap();
            assert_eq!(f.view.render_count(), 1);

            f.app.tick().await.unwrap();
            let last = f.view.last().unwrap();
            assert_eq!(last.remaining_seconds, 2);
            assert!(last.running);
        }

        #[tokio::test]
        async fn test_work_completion_runs_effects_and_saves() {
            let mut f = fixture(AppSettings {
                enable_auto_lock: true,
                ..short_settings()
            });
            f.app.apply(UserAction::Start).await.unwrap();

            for _ in 0..3 {
                f.app.tick().await.unwrap();
            }

            let last = f.view.last().unwrap();
            assert_eq!(last.phase, Phase::Break);
            assert_eq!(last.remaining_seconds, 2);
            assert_eq!(last.completed_cycles, 1);

            assert_eq!(f.locker.lock_count(), 1);
            assert_eq!(f.notifier.notice_count(), 1);

            let cues = f.scheduler.advance(Duration::from_millis(1000));
            let chimes = cues.iter().filter(|c| c.sound == AlertSound::Chime).count();
            assert_eq!(chimes, 3);

            assert_eq!(f.store.load().completed_cycles, 1);
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_toggle_pause() {
            let mut f = fixture(short_settings());

            f.app.apply(UserAction::TogglePause).await.unwrap();
            assert!(f.view.last().unwrap().running);

            f.app.apply(UserAction::TogglePause).await.unwrap();
            assert!(!f.view.last().unwrap().running);
        }

        #[tokio::test]
        async fn test_palette_is_persisted() {
            let mut f = fixture(short_settings());

            f.app.apply(UserAction::TogglePalette).await.unwrap();

            assert!(f.view.last().unwrap().dark_theme);
            assert!(f.store.load().is_dark_theme);
        }

        #[tokio::test]
        async fn test_quit_stops_without_touching_state() {
            let mut f = fixture(short_settings());

            assert!(!f.app.apply(UserAction::Quit).await.unwrap());
            assert_eq!(f.view.render_count(), 0);
        }

        #[tokio::test]
        async fn test_finish_saves_settings() {
            let mut f = fixture(short_settings());

            f.app.finish(None).await;

            let loaded = f.store.load();
            assert_eq!(loaded.work_duration_seconds, 3);
            assert_eq!(loaded.break_duration_seconds, 2);
        }
    }

    mod session_tests {
        use super::*;

        #[tokio::test]
        async fn test_session_theme_is_recorded() {
            let mut f = fixture(short_settings());
            let handler = f.app.request_handler();

            handler
                .handle(crate::types::IpcRequest::Session {
                    label: "Refactor parser".to_string(),
                })
                .await;
            assert_eq!(f.app.process_events().await, 1);

            let records = f.session_log.records().unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].label, "Refactor parser");
            assert_eq!(
                f.view.last().unwrap().session_theme,
                Some("Refactor parser".to_string())
            );
        }

        #[tokio::test]
        async fn test_cleared_theme_is_not_recorded() {
            let mut f = fixture(short_settings());
            let handler = f.app.request_handler();

            handler
                .handle(crate::types::IpcRequest::Session {
                    label: "  ".to_string(),
                })
                .await;
            f.app.process_events().await;

            assert!(f.session_log.records().unwrap().is_empty());
        }
    }

    mod run_tests {
        use super::*;
        use crate::cli::IpcClient;
        use crate::sound::MockSoundPlayer;
        use crate::types::IpcRequest;
        use tokio::time::{sleep_until, Instant};

        #[tokio::test]
        async fn test_resume_waits_a_full_second_before_ticking() {
            let Fixture { app, _dir: dir, .. } = fixture(AppSettings {
                work_duration_seconds: 60,
                ..short_settings()
            });
            let server = IpcServer::new(&dir.path().join("run.sock")).unwrap();
            let handler = app.request_handler();
            let engine = app.engine();
            let shutdown = app.shutdown_signal();
            let (_cue_tx, cue_rx) = mpsc::unbounded_channel();
            let origin = Instant::now();

            // Each window covers a whole second since `origin` but is shorter
            // than one second, and each start comes before the previous
            // window's next tick would be due.
            let drive = async {
                for (start_ms, pause_ms) in [(500, 1300), (1400, 2200), (2300, 3150)] {
                    sleep_until(origin + Duration::from_millis(start_ms)).await;
                    handler.handle(IpcRequest::Start).await;
                    sleep_until(origin + Duration::from_millis(pause_ms)).await;
                    handler.handle(IpcRequest::Pause).await;
                }
                let remaining = engine.lock().await.snapshot().remaining_seconds;
                shutdown.notify_one();
                remaining
            };

            let (result, remaining) = tokio::join!(
                app.run(
                    server,
                    cue_rx,
                    None::<MockSoundPlayer>,
                    AlertSounds::synthesized(),
                    None
                ),
                drive
            );

            result.unwrap();
            assert_eq!(remaining, 60);
        }

        #[tokio::test]
        async fn test_socket_commands_until_quit() {
            let Fixture {
                app,
                store,
                _dir: dir,
                ..
            } = fixture(short_settings());
            let socket_path = dir.path().join("run.sock");
            let server = IpcServer::new(&socket_path).unwrap();
            let client = IpcClient::with_socket_path(socket_path.clone());
            let (_cue_tx, cue_rx) = mpsc::unbounded_channel();

            let drive = async {
                let palette = client.palette().await.unwrap();
                let quit = client.quit().await.unwrap();
                (palette, quit)
            };

            let (result, (palette, quit)) = tokio::join!(
                app.run(
                    server,
                    cue_rx,
                    None::<MockSoundPlayer>,
                    AlertSounds::synthesized(),
                    None
                ),
                drive
            );

            result.unwrap();
            assert_eq!(palette.status, "success");
            assert_eq!(quit.status, "success");
            assert!(store.load().is_dark_theme);
            assert!(!socket_path.exists());
        }
    }

    mod tray_tests {
        use super::*;
        use crossbeam_channel::unbounded;

        #[tokio::test]
        async fn test_tray_receives_refresh_and_shutdown() {
            let (tx, rx) = unbounded();
            let mut f = fixture(short_settings());
            f.app = f.app.with_tray(tx);

            f.app.apply(UserAction::Start).await.unwrap();
            f.app.finish(None).await;

            assert!(matches!(rx.try_recv().unwrap(), TrayUpdate::Refresh(_)));
            assert!(matches!(rx.try_recv().unwrap(), TrayUpdate::Shutdown));
        }

        #[tokio::test]
        async fn test_tray_manager_follows_app() {
            let (tx, rx) = unbounded();
            let mut tray = TrayIconManager::new(rx);
            let mut f = fixture(short_settings());
            f.app = f.app.with_tray(tx);

            f.app.apply(UserAction::Start).await.unwrap();
            tray.process_pending_updates();

            assert!(tray.current_snapshot().unwrap().running);
            assert!(tray.current_bitmap().is_some());
        }
    }
}
