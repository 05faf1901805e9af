//! Fixed-duration animation
//!
//! [`TimedAnimation`] is the simplest [`Playable`]: it runs for a fixed number
//! of milliseconds on the scheduler clock and then fires its completion hook.
//! Hosts wrap their own rendering around it (reading [`TimedAnimation::progress`]
//! each frame); groups only care about its timing.

use crate::playable::{CompletionCallback, Playable};
use cadence_core::{SchedulerHandle, TimerId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Playback state of a timed animation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TimedState {
    /// Initial state, never played or reset
    #[default]
    Idle,
    /// Running since the given clock time
    Playing { started_at_ms: f64 },
    /// Reached (or was stopped at) its final state
    Finished,
}

struct TimedInner {
    duration_ms: f64,
    state: TimedState,
    timer: Option<TimerId>,
    /// Bumped on every play, so a stale timer can tell it was superseded
    generation: u64,
    play_count: u32,
    on_complete: Option<CompletionCallback>,
}

/// A fixed-duration animation driven by the timer scheduler
///
/// Cloning yields another handle to the same animation.
///
/// # Example
///
/// ```
/// use cadence_animation::{Playable, TimedAnimation};
/// use cadence_core::TimerScheduler;
///
/// let scheduler = TimerScheduler::new();
/// let fade = TimedAnimation::new(scheduler.handle(), 200.0);
///
/// fade.play();
/// scheduler.advance(50.0);
/// assert_eq!(fade.progress(), 0.25);
///
/// scheduler.advance(150.0);
/// assert!(fade.is_finished());
/// ```
#[derive(Clone)]
pub struct TimedAnimation {
    handle: SchedulerHandle,
    inner: Rc<RefCell<TimedInner>>,
}

impl TimedAnimation {
    /// Create an idle animation lasting `duration_ms`
    pub fn new(handle: SchedulerHandle, duration_ms: f64) -> Self {
        Self {
            handle,
            inner: Rc::new(RefCell::new(TimedInner {
                duration_ms: duration_ms.max(0.0),
                state: TimedState::Idle,
                timer: None,
                generation: 0,
                play_count: 0,
                on_complete: None,
            })),
        }
    }

    /// Wrap into the shared form groups hold
    pub fn shared(self) -> Rc<dyn Playable> {
        Rc::new(self)
    }

    pub fn state(&self) -> TimedState {
        self.inner.borrow().state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.inner.borrow().state, TimedState::Playing { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.inner.borrow().state == TimedState::Finished
    }

    pub fn is_idle(&self) -> bool {
        self.inner.borrow().state == TimedState::Idle
    }

    /// Clock time at which the current run started
    pub fn started_at_ms(&self) -> Option<f64> {
        match self.inner.borrow().state {
            TimedState::Playing { started_at_ms } => Some(started_at_ms),
            _ => None,
        }
    }

    /// Number of times `play()` has been called
    pub fn play_count(&self) -> u32 {
        self.inner.borrow().play_count
    }

    /// Get the current progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        let inner = self.inner.borrow();
        match inner.state {
            TimedState::Idle => 0.0,
            TimedState::Finished => 1.0,
            TimedState::Playing { started_at_ms } => {
                if inner.duration_ms <= 0.0 {
                    return 1.0;
                }
                let now = self.handle.now_ms().unwrap_or(started_at_ms);
                ((now - started_at_ms) / inner.duration_ms).clamp(0.0, 1.0)
            }
        }
    }

    fn cancel_timer(&self, inner: &mut TimedInner) {
        if let Some(id) = inner.timer.take() {
            self.handle.clear_timeout(id);
        }
    }

    /// Timer callback: finish the run if it is still the current one
    fn finish(inner: &Weak<RefCell<TimedInner>>, generation: u64) {
        let Some(inner) = inner.upgrade() else {
            return;
        };

        let hook = {
            let mut guard = inner.borrow_mut();
            let current = guard.generation == generation
                && matches!(guard.state, TimedState::Playing { .. });
            if !current {
                return;
            }
            guard.state = TimedState::Finished;
            guard.timer = None;
            guard.on_complete.take()
        };

        if let Some(hook) = hook {
            hook();
        }
    }
}

impl Playable for TimedAnimation {
    fn play(&self) {
        let (generation, duration_ms) = {
            let mut inner = self.inner.borrow_mut();
            self.cancel_timer(&mut inner);
            inner.generation += 1;
            inner.play_count += 1;
            inner.state = TimedState::Playing {
                started_at_ms: self.handle.now_ms().unwrap_or(0.0),
            };
            (inner.generation, inner.duration_ms)
        };

        let weak = Rc::downgrade(&self.inner);
        match self
            .handle
            .set_timeout(duration_ms, move || Self::finish(&weak, generation))
        {
            Some(id) => self.inner.borrow_mut().timer = Some(id),
            None => {
                tracing::warn!("TimedAnimation: scheduler dropped, completing immediately");
                Self::finish(&Rc::downgrade(&self.inner), generation);
            }
        }
    }

    fn stop(&self) {
        let mut inner = self.inner.borrow_mut();
        self.cancel_timer(&mut inner);
        if matches!(inner.state, TimedState::Playing { .. }) {
            inner.state = TimedState::Finished;
        }
    }

    fn reset(&self) {
        let mut inner = self.inner.borrow_mut();
        self.cancel_timer(&mut inner);
        inner.state = TimedState::Idle;
    }

    fn duration_ms(&self) -> f64 {
        self.inner.borrow().duration_ms
    }

    fn set_on_complete(&self, callback: Option<CompletionCallback>) {
        self.inner.borrow_mut().on_complete = callback;
    }
}
