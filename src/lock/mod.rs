//! Screen locking after a completed Work phase.
//!
//! When auto-lock is enabled, the application runs one platform command
//! after Work ends:
//!
//! | Platform | Command |
//! |---|---|
//! | macOS | `pmset displaysleepnow` |
//! | Linux | `loginctl lock-session` |
//! | Windows | `rundll32.exe user32.dll,LockWorkStation` |
//!
//! Failures are reported as [`LockError`] and never stop the timer.

pub mod error;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

pub use error::LockError;

/// Default timeout for the lock command in seconds.
const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// Returns the lock command for the current platform.
#[must_use]
pub fn lock_command() -> Option<(&'static str, &'static [&'static str])> {
    if cfg!(target_os = "macos") {
        Some(("pmset", &["displaysleepnow"][..]))
    } else if cfg!(target_os = "linux") {
        Some(("loginctl", &["lock-session"][..]))
    } else if cfg!(target_os = "windows") {
        Some(("rundll32.exe", &["user32.dll,LockWorkStation"][..]))
    } else {
        None
    }
}

#[allow(async_fn_in_trait)]
pub trait ScreenLocker {
    async fn lock(&self) -> Result<(), LockError>;
}

/// Locks the screen by running an external command.
#[derive(Debug, Clone)]
pub struct CommandScreenLocker {
    program: Option<String>,
    args: Vec<String>,
    timeout_seconds: u64,
}

impl CommandScreenLocker {
    /// Creates a locker for the current platform's lock command.
    #[must_use]
    pub fn platform_default() -> Self {
        match lock_command() {
            Some((program, args)) => Self::with_command(program, args.iter().copied()),
            None => Self {
                program: None,
                args: Vec::new(),
                timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            },
        }
    }

    /// Creates a locker running a custom command.
    #[must_use]
    pub fn with_command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: Some(program.into()),
            args: args.into_iter().map(Into::into).collect(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// Sets the timeout in seconds.
    pub fn set_timeout(&mut self, seconds: u64) {
        self.timeout_seconds = seconds;
    }
}

impl Default for CommandScreenLocker {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl ScreenLocker for CommandScreenLocker {
    async fn lock(&self) -> Result<(), LockError> {
        let Some(program) = self.program.as_deref() else {
            return Err(LockError::Unsupported);
        };

        info!(program, "Locking screen");

        let status = timeout(
            Duration::from_secs(self.timeout_seconds),
            Command::new(program).args(&self.args).kill_on_drop(true).status(),
        )
        .await
        .map_err(|_| LockError::Timeout(program.to_string(), self.timeout_seconds))?
        .map_err(|e| LockError::SpawnFailed(program.to_string(), e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            let err = LockError::CommandFailed(program.to_string(), status.to_string());
            warn!("{}", err);
            Err(err)
        }
    }
}

/// Records lock requests instead of locking.
#[derive(Debug, Default)]
pub struct MockScreenLocker {
    calls: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockScreenLocker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn lock_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScreenLocker for MockScreenLocker {
    async fn lock(&self) -> Result<(), LockError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(LockError::CommandFailed(
                "mock".to_string(),
                "simulated failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl<L: ScreenLocker> ScreenLocker for std::sync::Arc<L> {
    async fn lock(&self) -> Result<(), LockError> {
        self.as_ref().lock().await
    }
}
