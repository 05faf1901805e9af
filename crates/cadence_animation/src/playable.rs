//! Playable contract
//!
//! Everything a group can orchestrate implements [`Playable`]: leaf
//! animations and nested groups alike. Implementors are handles with interior
//! state, so every method takes `&self` and children can be shared between
//! the group and whoever built them.

use std::rc::Rc;

/// Single-shot completion hook
///
/// The animation takes the hook out of its slot when it fires, so each
/// assignment runs at most once.
pub type CompletionCallback = Box<dyn FnOnce()>;

/// A child as held by a group
pub type SharedPlayable = Rc<dyn Playable>;

/// A unit of playback a group can drive
pub trait Playable {
    /// Start (or restart) playback
    fn play(&self);

    /// Stop playback and jump to the final state
    fn stop(&self);

    /// Stop playback and return to the initial state
    fn reset(&self);

    /// Total playback time in milliseconds
    fn duration_ms(&self) -> f64;

    /// Assign or clear the completion hook
    ///
    /// The hook must fire at most once, when playback completes naturally.
    /// `stop()` and `reset()` never fire it. Implementations must not hold
    /// internal borrows while calling it, since the hook usually plays the
    /// next unit.
    fn set_on_complete(&self, callback: Option<CompletionCallback>);
}
