//! The running application behind `pomoclock run`.
//!
//! - `timer`: phase controller with Work/Break transitions
//! - `scheduler`: deferred one-shot deliveries for alert chimes
//! - `effects`: alerts, notices and screen lock on phase completion
//! - `ipc`: Unix socket control server
//! - `keys`: single-key shortcuts read in raw terminal mode
//! - `runtime`: the event loop tying everything together

pub mod effects;
pub mod ipc;
pub mod keys;
pub mod runtime;
pub mod scheduler;
pub mod timer;

pub use effects::TransitionEffects;
pub use ipc::{IpcError, IpcServer, RequestHandler};
pub use keys::KeyInput;
pub use runtime::{App, UserAction};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use timer::{TimerEngine, TimerEvent};
