//! Event emitter
//!
//! A small subscriber registry for single-threaded components. Listeners are
//! keyed by [`ListenerId`] so they can be removed individually.
//!
//! Components usually keep an [`Emitter`] inside a `RefCell`. Emitting while
//! that cell is borrowed would stop listeners from calling back into the
//! component, so the usual pattern is to take a [`Emitter::snapshot`] under
//! the borrow, release it, and call the listeners afterwards:
//!
//! ```
//! use cadence_core::Emitter;
//! use std::cell::RefCell;
//!
//! let events: RefCell<Emitter<u32>> = RefCell::new(Emitter::new());
//! events.borrow_mut().subscribe(|value| println!("got {value}"));
//!
//! let listeners = events.borrow().snapshot();
//! for listener in listeners {
//!     listener(&7);
//! }
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::rc::Rc;

new_key_type! {
    /// Handle to a registered listener
    pub struct ListenerId;
}

/// Shared listener callback
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// Registry of listeners for events of type `E`
pub struct Emitter<E> {
    listeners: SlotMap<ListenerId, Listener<E>>,
}

impl<E> Emitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: SlotMap::with_key(),
        }
    }

    /// Register a listener
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&E) + 'static,
    {
        self.listeners.insert(Rc::new(listener))
    }

    /// Remove a listener, returning false if it was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Clone out the current listeners
    pub fn snapshot(&self) -> SmallVec<[Listener<E>; 4]> {
        self.listeners.values().cloned().collect()
    }
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}
