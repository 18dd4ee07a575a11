//! Deferred one-shot deliveries.
//!
//! Alert chimes are played at fixed offsets after a phase transition. The
//! [`Scheduler`] trait hides how the delay is realised:
//! - [`TokioScheduler`] sleeps on the runtime and sends the payload on a channel
//! - [`ManualScheduler`] keeps payloads on a virtual clock advanced by tests
//!
//! Deliveries are independent: nothing is cancelled when the timer pauses.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;

/// Delivers a payload once, no earlier than `delay` from now.
pub trait Scheduler<T>: Send + Sync {
    fn schedule(&self, delay: Duration, payload: T);
}

// ============================================================================
// TokioScheduler
// ============================================================================

/// Scheduler backed by `tokio::time::sleep`.
///
/// Each payload is sent on the channel after its delay; the receiving end
/// belongs to the application loop.
#[derive(Debug, Clone)]
pub struct TokioScheduler<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> TokioScheduler<T> {
    /// Creates a scheduler delivering to `tx`.
    pub fn new(tx: mpsc::UnboundedSender<T>) -> Self {
        Self { tx }
    }
}

impl<T: Send + 'static> Scheduler<T> for TokioScheduler<T> {
    fn schedule(&self, delay: Duration, payload: T) {
        if delay.is_zero() {
            if self.tx.send(payload).is_err() {
                tracing::debug!("Deferred delivery dropped: receiver closed");
            }
            return;
        }

        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(payload).is_err() {
                tracing::debug!("Deferred delivery dropped: receiver closed");
            }
        });
    }
}

// ============================================================================
// ManualScheduler
// ============================================================================

#[derive(Debug)]
struct Pending<T> {
    due: Duration,
    seq: u64,
    payload: T,
}

#[derive(Debug)]
struct ManualClock<T> {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending<T>>,
}

/// Deterministic scheduler driven by an explicit virtual clock.
#[derive(Debug)]
pub struct ManualScheduler<T> {
    clock: Mutex<ManualClock<T>>,
}

impl<T> Default for ManualScheduler<T> {
    fn default() -> Self {
        Self {
            clock: Mutex::new(ManualClock {
                now: Duration::ZERO,
                next_seq: 0,
                pending: Vec::new(),
            }),
        }
    }
}

impl<T> ManualScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the virtual clock forward and returns every payload now due,
    /// ordered by due time then by scheduling order.
    pub fn advance(&self, by: Duration) -> Vec<T> {
        let mut clock = self.clock.lock().unwrap_or_else(|e| e.into_inner());
        clock.now += by;
        let now = clock.now;

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            clock.pending.drain(..).partition(|p| p.due <= now);
        clock.pending = waiting;

        due.sort_by_key(|p| (p.due, p.seq));
        due.into_iter().map(|p| p.payload).collect()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.clock.lock().unwrap_or_else(|e| e.into_inner()).now
    }

    /// Number of payloads not yet delivered.
    pub fn pending_count(&self) -> usize {
        self.clock
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pending
            .len()
    }
}

impl<T: Send> Scheduler<T> for ManualScheduler<T> {
    fn schedule(&self, delay: Duration, payload: T) {
        let mut clock = self.clock.lock().unwrap_or_else(|e| e.into_inner());
        let due = clock.now + delay;
        let seq = clock.next_seq;
        clock.next_seq += 1;
        clock.pending.push(Pending { due, seq, payload });
    }
}

impl<T, S: Scheduler<T> + ?Sized> Scheduler<T> for std::sync::Arc<S> {
    fn schedule(&self, delay: Duration, payload: T) {
        self.as_ref().schedule(delay, payload);
    }
}

// ============================================================================
// Tests
// ============================================================================
