//! End-to-End Tests for pomoclock.
//!
//! These tests drive the whole application loop (`App`) with mocks for every
//! collaborator and a virtual clock for deferred chimes:
//! - Complete Work → Break → Work cycles
//! - Pause, continue and reset flows
//! - Alerts, notices and auto-lock on phase completion
//! - Persistence across restarts and session theme export

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use pomoclock::config::{AppSettings, SettingsStore};
use pomoclock::daemon::{App, ManualScheduler, TransitionEffects, UserAction};
use pomoclock::lock::MockScreenLocker;
use pomoclock::notification::MockNotifier;
use pomoclock::session::{export_range, SessionLog};
use pomoclock::sound::{AlertCue, AlertSound};
use pomoclock::types::{IpcRequest, Phase, TickOutcome};
use pomoclock::view::MockView;

// ============================================================================
// Test Helpers
// ============================================================================

type TestApp = App<Arc<MockNotifier>, Arc<MockScreenLocker>>;

struct World {
    app: TestApp,
    view: MockView,
    scheduler: Arc<ManualScheduler<AlertCue>>,
    notifier: Arc<MockNotifier>,
    locker: Arc<MockScreenLocker>,
    dir: tempfile::TempDir,
}

impl World {
    fn new(settings: AppSettings) -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self::in_dir(dir, settings)
    }

    /// Builds an application over `dir`, as a restart would.
    fn in_dir(dir: tempfile::TempDir, settings: AppSettings) -> Self {
        let scheduler = Arc::new(ManualScheduler::new());
        let notifier = Arc::new(MockNotifier::new());
        let locker = Arc::new(MockScreenLocker::new());
        let effects = TransitionEffects::new(scheduler.clone(), notifier.clone(), locker.clone());
        let view = MockView::new();

        let app = App::new(
            settings,
            SettingsStore::in_dir(dir.path()),
            SessionLog::new(dir.path().join("session_themes.jsonl")),
            effects,
        )
        .with_view(view.clone());

        Self {
            app,
            view,
            scheduler,
            notifier,
            locker,
            dir,
        }
    }

    fn store(&self) -> SettingsStore {
        SettingsStore::in_dir(self.dir.path())
    }

    fn session_log(&self) -> SessionLog {
        SessionLog::new(self.dir.path().join("session_themes.jsonl"))
    }

    async fn ticks(&mut self, count: u32) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..count {
            outcomes.push(self.app.tick().await.unwrap());
        }
        outcomes
    }
}

fn chime_count(cues: &[AlertCue]) -> usize {
    cues.iter().filter(|c| c.sound == AlertSound::Chime).count()
}

fn fast_settings() -> AppSettings {
    AppSettings {
        work_duration_seconds: 60,
        break_duration_seconds: 30,
        ..AppSettings::default()
    }
}

// ============================================================================
// Complete Cycles
// ============================================================================

#[tokio::test]
async fn test_default_work_phase_ends_after_1500_ticks() {
    let mut world = World::new(AppSettings::default());
    world.app.apply(UserAction::Start).await.unwrap();

    let outcomes = world.ticks(1500).await;

    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == TickOutcome::Expired)
            .count(),
        1
    );
    let snapshot = world.app.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Break);
    assert_eq!(snapshot.remaining_seconds, 300);
    assert_eq!(snapshot.completed_cycles, 1);
    assert!(snapshot.running);
    assert_eq!(snapshot.progress(), 0);
}

#[tokio::test]
async fn test_full_cycle_returns_to_work() {
    let mut world = World::new(fast_settings());
    world.app.apply(UserAction::Start).await.unwrap();

    world.ticks(60).await;
    assert_eq!(world.app.snapshot().await.phase, Phase::Break);

    world.ticks(30).await;
    let snapshot = world.app.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Work);
    assert_eq!(snapshot.remaining_seconds, 60);
    assert_eq!(snapshot.completed_cycles, 1);

    world.ticks(90).await;
    assert_eq!(world.app.snapshot().await.completed_cycles, 2);
}

#[tokio::test]
async fn test_views_follow_every_tick() {
    let mut world = World::new(fast_settings());
    world.app.apply(UserAction::Start).await.unwrap();

    world.ticks(30).await;

    let rendered = world.view.rendered();
    assert_eq!(rendered.len(), 31);
    let progress: Vec<u32> = rendered.iter().map(|s| s.progress()).collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(rendered.last().unwrap().progress(), 50);
}

// ============================================================================
// Pause / Continue / Reset
// ============================================================================

#[tokio::test]
async fn test_pause_and_continue_flow() {
    let mut world = World::new(fast_settings());
    world.app.apply(UserAction::Start).await.unwrap();
    world.ticks(10).await;

    world.app.apply(UserAction::TogglePause).await.unwrap();
    world.ticks(20).await;
    assert_eq!(world.app.snapshot().await.remaining_seconds, 50);

    world.app.apply(UserAction::TogglePause).await.unwrap();
    world.ticks(5).await;
    assert_eq!(world.app.snapshot().await.remaining_seconds, 45);
}

#[tokio::test]
async fn test_reset_mid_break_restores_work() {
    let mut world = World::new(fast_settings());
    world.app.apply(UserAction::Start).await.unwrap();
    world.ticks(70).await;
    assert_eq!(world.app.snapshot().await.phase, Phase::Break);

    world.app.apply(UserAction::Reset).await.unwrap();

    let snapshot = world.app.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Work);
    assert_eq!(snapshot.remaining_seconds, 60);
    assert!(!snapshot.running);
    assert_eq!(snapshot.completed_cycles, 1);
}

// ============================================================================
// Alerts
// ============================================================================

#[tokio::test]
async fn test_transition_alerts_are_delivered_in_order() {
    let mut world = World::new(AppSettings {
        volume: 0.3,
        ..fast_settings()
    });
    world.app.apply(UserAction::Start).await.unwrap();
    world.ticks(60).await;

    let now = world.scheduler.advance(Duration::ZERO);
    assert_eq!(chime_count(&now), 1);
    assert!(now
        .iter()
        .filter(|c| c.sound == AlertSound::Chime)
        .all(|c| (c.volume - 0.3).abs() < f32::EPSILON));

    assert!(world.scheduler.advance(Duration::from_millis(499)).is_empty());
    assert_eq!(chime_count(&world.scheduler.advance(Duration::from_millis(1))), 1);
    assert_eq!(chime_count(&world.scheduler.advance(Duration::from_millis(500))), 1);
    assert_eq!(world.scheduler.pending_count(), 0);

    assert_eq!(world.notifier.notice_count(), 1);
    assert_eq!(world.locker.lock_count(), 0);
}

#[tokio::test]
async fn test_auto_lock_only_after_work() {
    let mut world = World::new(AppSettings {
        enable_auto_lock: true,
        ..fast_settings()
    });
    world.app.apply(UserAction::Start).await.unwrap();

    world.ticks(60).await;
    assert_eq!(world.locker.lock_count(), 1);

    world.ticks(30).await;
    assert_eq!(world.locker.lock_count(), 1);
    assert_eq!(world.notifier.notice_count(), 2);
}

#[tokio::test]
async fn test_failing_collaborators_do_not_stop_the_timer() {
    let mut world = World::new(AppSettings {
        enable_auto_lock: true,
        ..fast_settings()
    });
    world.locker.set_should_fail(true);
    world.notifier.set_should_fail(true);
    world.app.apply(UserAction::Start).await.unwrap();

    world.ticks(61).await;

    let snapshot = world.app.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Break);
    assert_eq!(snapshot.remaining_seconds, 29);
    assert_eq!(snapshot.completed_cycles, 1);
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_settings_survive_restart() {
    let mut world = World::new(fast_settings());
    world.app.apply(UserAction::Start).await.unwrap();
    world.ticks(60).await;
    world.app.apply(UserAction::TogglePalette).await.unwrap();
    world.app.finish(None).await;

    let loaded = world.store().load();
    assert_eq!(loaded.completed_cycles, 1);
    assert!(loaded.is_dark_theme);

    let World { dir, .. } = world;
    let restarted = World::in_dir(dir, loaded);
    let snapshot = restarted.app.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Work);
    assert!(!snapshot.running);
    assert_eq!(snapshot.remaining_seconds, 60);
    assert_eq!(snapshot.completed_cycles, 1);
    assert!(snapshot.dark_theme);
}

#[tokio::test]
async fn test_session_themes_are_exported() {
    let mut world = World::new(fast_settings());
    let handler = world.app.request_handler();
    let started = Local::now() - chrono::Duration::seconds(1);

    for label in ["Design review", "", "Write tests, docs"] {
        handler
            .handle(IpcRequest::Session {
                label: label.to_string(),
            })
            .await;
        world.app.process_events().await;
    }

    let output = world.dir.path().join("export").join("week.csv");
    let count = export_range(
        &world.session_log(),
        started,
        Local::now() + chrono::Duration::seconds(1),
        &output,
    )
    .unwrap();

    assert_eq!(count, 2);
    let contents = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "timestamp,label");
    assert!(lines[1].ends_with(",Design review"));
    assert!(lines[2].ends_with(",\"Write tests, docs\""));
}

#[tokio::test]
async fn test_empty_range_exports_header_only() {
    let world = World::new(fast_settings());
    let output = world.dir.path().join("empty.md");
    let now = Local::now();

    let count = export_range(
        &world.session_log(),
        now - chrono::Duration::days(7),
        now,
        &output,
    )
    .unwrap();

    assert_eq!(count, 0);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "| timestamp | label |\n| --- | --- |\n"
    );
}
