//! Cadence Core
//!
//! Host-side primitives shared by the Cadence animation crates:
//!
//! - **Timer Scheduler**: single-threaded delayed callbacks over a clock the
//!   host advances (virtual time in tests, frame time in apps)
//! - **Event Emitter**: keyed listener registry with re-entrancy-safe snapshots
//! - **Cancellation**: shared flags checked at every resumption point

pub mod cancel;
pub mod events;
pub mod timer;

pub use cancel::CancelToken;
pub use events::{Emitter, Listener, ListenerId};
pub use timer::{SchedulerHandle, TimerCallback, TimerId, TimerScheduler};
