//! pomoclock library
//!
//! This library provides the core functionality behind the `pomoclock` binary.
//! It includes:
//! - Timer engine with Work/Break transitions and a completed-cycle count
//! - IPC server/client for controlling the running timer
//! - Presentation sinks: terminal label, floating overlay, tray icon
//! - Alert sounds, desktop notifications and the optional screen lock
//! - Persisted settings and the session theme log with CSV/Markdown export

pub mod cli;
pub mod config;
pub mod daemon;
pub mod lock;
pub mod menubar;
pub mod notification;
pub mod session;
pub mod sound;
pub mod types;
pub mod view;

// Re-export commonly used types for convenience
pub use types::{
    IpcRequest, IpcResponse, OverlayAction, OverlayPosition, Phase, ResponseData, TimerSnapshot,
    TimerState,
};

pub use config::{AppSettings, ConfigError, SettingsStore};

pub use daemon::{App, ManualScheduler, Scheduler, TimerEngine, TimerEvent, TransitionEffects};

// Re-export menubar types
pub use menubar::{
    EventHandler, IconManager, MenuAction, MenuBuilder, MenuConfig, MenuItemConfig, MenuItemId,
    TrayIconManager, TrayUpdate,
};

// Re-export collaborator types
pub use lock::{CommandScreenLocker, LockError, MockScreenLocker, ScreenLocker};
pub use notification::{DesktopNotifier, MockNotifier, Notice, NotificationError, Notifier};
pub use sound::{AlertCue, AlertSound, MockSoundPlayer, RodioSoundPlayer, SoundError, SoundPlayer};

pub use session::{SessionError, SessionLog, SessionRecord};
pub use view::{MockView, View};
