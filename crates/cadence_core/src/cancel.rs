//! Cooperative cancellation
//!
//! A [`CancelToken`] is a shared flag. Work that suspends (timer ticks,
//! completion hooks) captures a clone and checks it when it resumes; whoever
//! owns the work cancels it by flipping the flag. Nothing is interrupted
//! forcibly.

use std::cell::Cell;
use std::rc::Rc;

/// Shared cancellation flag
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
