//! Timer scheduler
//!
//! A single-threaded delayed-callback queue with its own clock. The host
//! drives it, either deterministically with [`TimerScheduler::advance`] or
//! from a frame loop with [`TimerScheduler::tick`]. Callbacks never run while
//! the scheduler is borrowed, so a callback may freely schedule or clear
//! other timers.
//!
//! Components receive a [`SchedulerHandle`], a weak reference that won't keep
//! the scheduler alive:
//!
//! ```
//! use cadence_core::TimerScheduler;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let scheduler = TimerScheduler::new();
//! let handle = scheduler.handle();
//!
//! let fired = Rc::new(Cell::new(false));
//! let flag = fired.clone();
//! handle.set_timeout(100.0, move || flag.set(true));
//!
//! scheduler.advance(99.0);
//! assert!(!fired.get());
//! scheduler.advance(1.0);
//! assert!(fired.get());
//! ```

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::{Rc, Weak};
use std::time::Instant;

new_key_type! {
    /// Handle to a pending timer
    pub struct TimerId;
}

/// Single-shot timer callback
pub type TimerCallback = Box<dyn FnOnce()>;

struct PendingTimer {
    due_ms: f64,
    /// Insertion order, breaks ties between timers due at the same instant
    seq: u64,
    callback: TimerCallback,
}

/// Internal state of the timer scheduler
struct SchedulerInner {
    timers: SlotMap<TimerId, PendingTimer>,
    now_ms: f64,
    next_seq: u64,
    last_frame: Instant,
}

impl SchedulerInner {
    /// Remove the earliest timer due at or before `limit_ms`
    fn pop_due(&mut self, limit_ms: f64) -> Option<(f64, TimerCallback)> {
        let id = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.due_ms <= limit_ms)
            .min_by(|(_, a), (_, b)| match a.due_ms.total_cmp(&b.due_ms) {
                Ordering::Equal => a.seq.cmp(&b.seq),
                other => other,
            })
            .map(|(id, _)| id)?;

        self.timers
            .remove(id)
            .map(|timer| (timer.due_ms, timer.callback))
    }

    fn next_due(&self) -> Option<f64> {
        self.timers
            .values()
            .map(|timer| timer.due_ms)
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// The scheduler that owns all pending timers and the clock
///
/// Dropping the scheduler drops every pending callback; handles held by
/// components turn into no-ops.
pub struct TimerScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                timers: SlotMap::with_key(),
                now_ms: 0.0,
                next_seq: 0,
                last_frame: Instant::now(),
            })),
        }
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Current clock value in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.inner.borrow().now_ms
    }

    /// Number of timers waiting to fire
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().timers.is_empty()
    }

    /// Clock value at which the next timer fires, if any
    pub fn next_due_ms(&self) -> Option<f64> {
        self.inner.borrow().next_due()
    }

    /// Advance the clock by `dt_ms`, firing every timer that falls due
    ///
    /// Timers fire in due order (scheduling order for ties), with the clock
    /// set to each timer's due time while its callback runs. Timers scheduled
    /// by a callback fire within the same call if they fall inside the window.
    ///
    /// Returns the number of callbacks that ran.
    pub fn advance(&self, dt_ms: f64) -> usize {
        let target = {
            let inner = self.inner.borrow();
            inner.now_ms + if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 }
        };

        let mut fired = 0;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let next = inner.pop_due(target);
                if let Some((due_ms, _)) = &next {
                    inner.now_ms = inner.now_ms.max(*due_ms);
                }
                next
            };

            let Some((due_ms, callback)) = next else {
                break;
            };
            tracing::trace!(due_ms, "TimerScheduler: firing timer");
            callback();
            fired += 1;
        }

        self.inner.borrow_mut().now_ms = target;
        fired
    }

    /// Advance by the wall-clock time elapsed since the previous tick
    ///
    /// Returns true if timers are still pending (need another tick).
    pub fn tick(&self) -> bool {
        let dt_ms = {
            let mut inner = self.inner.borrow_mut();
            let now = Instant::now();
            let dt = (now - inner.last_frame).as_secs_f64() * 1000.0;
            inner.last_frame = now;
            dt
        };

        self.advance(dt_ms);
        self.has_pending()
    }

    /// Jump from timer to timer until nothing is pending or `limit_ms` of
    /// clock time has elapsed
    ///
    /// Returns the clock time that elapsed.
    pub fn run_until_idle(&self, limit_ms: f64) -> f64 {
        let start = self.now_ms();
        let deadline = start + limit_ms.max(0.0);

        while let Some(due_ms) = self.next_due_ms() {
            if due_ms > deadline {
                break;
            }
            let now = self.now_ms();
            self.advance((due_ms - now).max(0.0));
        }

        self.now_ms() - start
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the timer scheduler
///
/// This is passed to components that need delayed callbacks. It won't
/// prevent the scheduler from being dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Schedule `callback` to run once, `delay_ms` from now
    ///
    /// Negative or non-finite delays run on the next advance. Returns `None`
    /// if the scheduler has been dropped.
    pub fn set_timeout<F>(&self, delay_ms: f64, callback: F) -> Option<TimerId>
    where
        F: FnOnce() + 'static,
    {
        let delay_ms = if delay_ms.is_finite() {
            delay_ms.max(0.0)
        } else {
            0.0
        };

        self.inner.upgrade().map(|inner| {
            let mut guard = inner.borrow_mut();
            let seq = guard.next_seq;
            guard.next_seq += 1;
            let due_ms = guard.now_ms + delay_ms;
            guard.timers.insert(PendingTimer {
                due_ms,
                seq,
                callback: Box::new(callback),
            })
        })
    }

    /// Drop a pending timer without running it
    ///
    /// Returns false if the timer already fired or never existed.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow_mut().timers.remove(id).is_some())
            .unwrap_or(false)
    }

    /// Current clock value, or `None` once the scheduler is gone
    pub fn now_ms(&self) -> Option<f64> {
        self.inner.upgrade().map(|inner| inner.borrow().now_ms)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
