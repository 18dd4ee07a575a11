//! Side effects of phase transitions.
//!
//! On `WorkCompleted` / `BreakCompleted` the application:
//! - schedules three chimes at 0, 500 and 1000 ms at the configured volume
//! - shows a notice and schedules the reminder tone at 0 and 500 ms
//! - locks the screen after Work when auto-lock is enabled
//!
//! Every step is best effort: failures are logged and the timer continues.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::lock::ScreenLocker;
use crate::notification::{Notice, Notifier};
use crate::sound::{AlertCue, AlertSound};
use crate::types::TimerSnapshot;

use super::scheduler::Scheduler;
use super::timer::TimerEvent;

/// Offsets of the transition chimes.
pub const CHIME_OFFSETS_MS: [u64; 3] = [0, 500, 1000];

/// Offsets of the reminder tone.
pub const REMINDER_OFFSETS_MS: [u64; 2] = [0, 500];

/// Fixed volume of the reminder tone.
pub const REMINDER_VOLUME: f32 = 0.8;

/// Runs alerts, notices and the screen lock for phase transitions.
pub struct TransitionEffects<N, L> {
    scheduler: Arc<dyn Scheduler<AlertCue>>,
    notifier: N,
    locker: L,
}

impl<N: Notifier, L: ScreenLocker> TransitionEffects<N, L> {
    pub fn new(scheduler: Arc<dyn Scheduler<AlertCue>>, notifier: N, locker: L) -> Self {
        Self {
            scheduler,
            notifier,
            locker,
        }
    }

    /// Handles one engine event. `snapshot` is the state after the event.
    pub async fn on_event(&self, event: &TimerEvent, snapshot: &TimerSnapshot) {
        match event {
            TimerEvent::WorkCompleted { completed_cycles } => {
                self.schedule_chimes(snapshot.volume);

                let screen_locked = snapshot.auto_lock && self.lock_screen().await;
                self.show(&Notice::work_complete(*completed_cycles, screen_locked));
            }
            TimerEvent::BreakCompleted => {
                self.schedule_chimes(snapshot.volume);
                self.show(&Notice::break_complete());
            }
            _ => {}
        }
    }

    fn schedule_chimes(&self, volume: f32) {
        for offset in CHIME_OFFSETS_MS {
            self.scheduler.schedule(
                Duration::from_millis(offset),
                AlertCue::new(AlertSound::Chime, volume),
            );
        }
    }

    /// Returns true if the lock command succeeded.
    async fn lock_screen(&self) -> bool {
        match self.locker.lock().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Screen lock failed: {}. {}", e, e.suggestion());
                false
            }
        }
    }

    fn show(&self, notice: &Notice) {
        for offset in REMINDER_OFFSETS_MS {
            self.scheduler.schedule(
                Duration::from_millis(offset),
                AlertCue::new(AlertSound::Reminder, REMINDER_VOLUME),
            );
        }

        if let Err(e) = self.notifier.notify(notice) {
            warn!("Notification failed: {}. {}", e, e.suggestion());
        } else {
            debug!(balloon = %notice.balloon, "Notice shown");
        }
    }
}
