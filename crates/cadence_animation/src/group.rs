//! Group animations
//!
//! A [`GroupAnimation`] plays a fixed list of [`Playable`] children as one
//! unit, using one of three strategies:
//!
//! - **Together**: every child starts at once. Completion is signalled by the
//!   *last declared* child, not by whichever child finishes last.
//! - **Sequential**: each child starts when the previous one completes.
//! - **Interval**: children start one by one, `interval` ms apart, on the
//!   timer scheduler. Completion is signalled by the last declared child.
//!
//! Groups implement [`Playable`] themselves, so they nest.
//!
//! # Cycles and cancellation
//!
//! Each `play()` starts a new cycle with its own [`CancelToken`]. Every
//! continuation (a child's completion hook, an interval tick) captures the
//! token and checks it when it resumes. `stop()`, `reset()`, `dispose()` and a
//! replay cancel the running cycle, which turns its outstanding hooks and
//! ticks into no-ops. Children that already started are stopped or reset by
//! the group, never interrupted by it.
//!
//! A cancelled cycle never fires completion. Only a cycle that runs to its
//! end emits [`GroupEvent::Complete`], exactly once.
//!
//! # Example
//!
//! ```
//! use cadence_animation::{GroupAnimation, GroupOptionsPatch, PlayType, TimedAnimation};
//! use cadence_core::TimerScheduler;
//!
//! let scheduler = TimerScheduler::new();
//! let handle = scheduler.handle();
//!
//! let group = GroupAnimation::with_options(
//!     handle.clone(),
//!     vec![
//!         TimedAnimation::new(handle.clone(), 10.0).shared(),
//!         TimedAnimation::new(handle.clone(), 20.0).shared(),
//!     ],
//!     GroupOptionsPatch::new().play_type(PlayType::Sequential),
//! );
//! assert_eq!(group.duration_ms().unwrap(), 30.0);
//!
//! group.play().unwrap();
//! scheduler.advance(30.0);
//! assert!(!group.is_playing());
//! ```

use crate::duration::estimate_duration;
use crate::error::{GroupError, Result};
use crate::options::{GroupAnimationOptions, GroupOptionsPatch, PlayType};
use crate::playable::{CompletionCallback, Playable, SharedPlayable};
use cadence_core::{CancelToken, Emitter, ListenerId, SchedulerHandle, TimerId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Events emitted by a group animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupEvent {
    /// Every child finished; fired once per completed cycle
    Complete,
}

/// Lifecycle phase of a group
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroupPhase {
    /// Not playing; initial state and the state after reset or completion
    #[default]
    Idle,
    /// A cycle is running
    Playing,
    /// Completion callbacks are running
    Completing,
    /// Playback was stopped before completing
    Stopped,
    /// The group was disposed
    Disposed,
}

/// Bookkeeping for one play cycle
struct Cycle {
    id: u64,
    token: CancelToken,
    /// Next child to start (sequential and interval strategies)
    cursor: usize,
    /// Interval frozen at cycle start
    interval_ms: f64,
    /// Pending interval tick
    tick: Option<TimerId>,
    /// A sequential step is on the stack
    advancing: bool,
    /// A child completed while `advancing` was set
    pending: bool,
}

struct GroupState {
    children: Vec<SharedPlayable>,
    options: GroupAnimationOptions,
    duration_ms: f64,
    phase: GroupPhase,
    cycle: Option<Cycle>,
    next_cycle_id: u64,
    /// Parent hook, taken when completion fires
    on_complete: Option<CompletionCallback>,
    events: Emitter<GroupEvent>,
}

impl GroupState {
    fn ensure_live(&self) -> Result<()> {
        if self.phase == GroupPhase::Disposed {
            Err(GroupError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Cancel the running cycle and drop its pending tick
    fn cancel_cycle(&mut self, scheduler: &SchedulerHandle) -> Option<u64> {
        self.cycle.take().map(|cycle| {
            cycle.token.cancel();
            if let Some(tick) = cycle.tick {
                scheduler.clear_timeout(tick);
            }
            cycle.id
        })
    }
}

/// A group of animations played as one unit
///
/// Cloning yields another handle to the same group.
#[derive(Clone)]
pub struct GroupAnimation {
    scheduler: SchedulerHandle,
    state: Rc<RefCell<GroupState>>,
}

impl GroupAnimation {
    /// Create a group with default options (`together`, 100ms, no auto play)
    pub fn new(scheduler: SchedulerHandle, children: Vec<SharedPlayable>) -> Self {
        let group = Self {
            scheduler,
            state: Rc::new(RefCell::new(GroupState {
                children,
                options: GroupAnimationOptions::default(),
                duration_ms: 0.0,
                phase: GroupPhase::Idle,
                cycle: None,
                next_cycle_id: 0,
                on_complete: None,
                events: Emitter::new(),
            })),
        };
        group.refresh_duration();
        group
    }

    /// Create a group and apply options
    ///
    /// Options with `autoPlay: true` start playback right away.
    pub fn with_options(
        scheduler: SchedulerHandle,
        children: Vec<SharedPlayable>,
        options: impl Into<GroupOptionsPatch>,
    ) -> Self {
        let group = Self::new(scheduler, children);
        if group.apply_options(&options.into()) {
            group.start_cycle();
        }
        group
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Check if a cycle is running
    pub fn is_playing(&self) -> bool {
        self.state.borrow().phase == GroupPhase::Playing
    }

    pub fn phase(&self) -> GroupPhase {
        self.state.borrow().phase
    }

    pub fn child_count(&self) -> usize {
        self.state.borrow().children.len()
    }

    /// Get a copy of the current options
    pub fn options(&self) -> Result<GroupAnimationOptions> {
        let state = self.state.borrow();
        state.ensure_live()?;
        Ok(state.options.clone())
    }

    /// Total playback time under the current options
    ///
    /// Recomputed from the children's current durations on every call.
    pub fn duration_ms(&self) -> Result<f64> {
        self.state.borrow().ensure_live()?;
        Ok(self.refresh_duration())
    }

    // =========================================================================
    // Event channel
    // =========================================================================

    /// Register a listener for group events
    pub fn subscribe<F>(&self, listener: F) -> Result<ListenerId>
    where
        F: Fn(&GroupEvent) + 'static,
    {
        let mut state = self.state.borrow_mut();
        state.ensure_live()?;
        Ok(state.events.subscribe(listener))
    }

    /// Remove a listener, returning false if it was not registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.state.borrow_mut().events.unsubscribe(id)
    }

    // =========================================================================
    // Playback
    // =========================================================================

    /// Play the group
    ///
    /// Calling this while a cycle is running cancels that cycle and starts a
    /// new one from the first child; the old cycle never completes.
    pub fn play(&self) -> Result<()> {
        self.state.borrow().ensure_live()?;
        self.start_cycle();
        Ok(())
    }

    /// Stop every child, jumping each to its final state
    ///
    /// The cycle ends silently: no completion event is fired.
    pub fn stop(&self) -> Result<()> {
        let children = {
            let mut state = self.state.borrow_mut();
            state.ensure_live()?;
            if let Some(id) = state.cancel_cycle(&self.scheduler) {
                tracing::debug!(cycle = id, "GroupAnimation: cycle stopped");
            }
            if matches!(state.phase, GroupPhase::Playing | GroupPhase::Completing) {
                state.phase = GroupPhase::Stopped;
            }
            state.children.clone()
        };

        for child in &children {
            child.stop();
        }
        Ok(())
    }

    /// Reset every child to its initial state
    ///
    /// The cycle ends silently: no completion event is fired.
    pub fn reset(&self) -> Result<()> {
        let children = {
            let mut state = self.state.borrow_mut();
            state.ensure_live()?;
            if let Some(id) = state.cancel_cycle(&self.scheduler) {
                tracing::debug!(cycle = id, "GroupAnimation: cycle reset");
            }
            state.phase = GroupPhase::Idle;
            state.children.clone()
        };

        for child in &children {
            child.reset();
        }
        Ok(())
    }

    /// Merge new options into the group
    ///
    /// A running cycle is stopped first and restarted once the options are
    /// applied. A patch with `autoPlay: true` starts playback even if the
    /// group was idle.
    pub fn set_options(&self, patch: impl Into<GroupOptionsPatch>) -> Result<()> {
        let patch = patch.into();
        let was_playing = {
            let state = self.state.borrow();
            state.ensure_live()?;
            state.phase == GroupPhase::Playing
        };

        if was_playing {
            self.stop()?;
        }

        let auto_play = self.apply_options(&patch);
        if was_playing || auto_play {
            self.start_cycle();
        }
        Ok(())
    }

    /// Stop playback and release children, listeners and the parent hook
    ///
    /// Every later call on this group returns [`GroupError::Disposed`].
    pub fn dispose(&self) -> Result<()> {
        self.stop()?;

        // Drop released values only after the borrow ends; their destructors
        // may reach back into this group.
        let (children, events, hook) = {
            let mut state = self.state.borrow_mut();
            state.phase = GroupPhase::Disposed;
            state.duration_ms = 0.0;
            (
                std::mem::take(&mut state.children),
                std::mem::take(&mut state.events),
                state.on_complete.take(),
            )
        };

        tracing::debug!(
            children = children.len(),
            listeners = events.len(),
            "GroupAnimation: disposed"
        );
        drop((children, events, hook));
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn refresh_duration(&self) -> f64 {
        let (children, play_type, interval_ms) = {
            let state = self.state.borrow();
            (
                state.children.clone(),
                state.options.play_type,
                state.options.interval,
            )
        };

        let duration = estimate_duration(
            children.iter().map(|child| child.duration_ms()),
            play_type,
            interval_ms,
        );
        self.state.borrow_mut().duration_ms = duration;
        duration
    }

    /// Apply a patch and recompute the duration; true if it asked to auto play
    fn apply_options(&self, patch: &GroupOptionsPatch) -> bool {
        let auto_play = {
            let mut state = self.state.borrow_mut();
            let auto_play = state.options.apply(patch);
            tracing::debug!(
                play_type = %state.options.play_type,
                interval_ms = state.options.interval,
                auto_play = state.options.auto_play,
                "GroupAnimation: options applied"
            );
            auto_play
        };

        self.refresh_duration();
        auto_play
    }

    /// Begin a new cycle and hand it to the configured strategy
    fn start_cycle(&self) {
        let (ctx, play_type, empty) = {
            let mut state = self.state.borrow_mut();
            if let Some(id) = state.cancel_cycle(&self.scheduler) {
                tracing::debug!(cycle = id, "GroupAnimation: replay cancels running cycle");
            }

            let id = state.next_cycle_id;
            state.next_cycle_id += 1;
            let token = CancelToken::new();
            state.cycle = Some(Cycle {
                id,
                token: token.clone(),
                cursor: 0,
                interval_ms: state.options.interval,
                tick: None,
                advancing: false,
                pending: false,
            });
            state.phase = GroupPhase::Playing;

            tracing::debug!(
                cycle = id,
                play_type = %state.options.play_type,
                children = state.children.len(),
                "GroupAnimation: cycle started"
            );

            let ctx = CycleCtx {
                state: Rc::downgrade(&self.state),
                scheduler: self.scheduler.clone(),
                token,
                id,
            };
            (ctx, state.options.play_type, state.children.is_empty())
        };

        if empty {
            complete_cycle(&self.state, ctx.id);
            return;
        }

        match play_type {
            PlayType::Together => play_together(&ctx),
            PlayType::Sequential => advance_sequence(ctx),
            PlayType::Interval => interval_tick(ctx),
        }
    }
}

impl Playable for GroupAnimation {
    fn play(&self) {
        if let Err(err) = GroupAnimation::play(self) {
            tracing::warn!("GroupAnimation: play ignored ({})", err);
        }
    }

    fn stop(&self) {
        if let Err(err) = GroupAnimation::stop(self) {
            tracing::warn!("GroupAnimation: stop ignored ({})", err);
        }
    }

    fn reset(&self) {
        if let Err(err) = GroupAnimation::reset(self) {
            tracing::warn!("GroupAnimation: reset ignored ({})", err);
        }
    }

    fn duration_ms(&self) -> f64 {
        GroupAnimation::duration_ms(self).unwrap_or(0.0)
    }

    fn set_on_complete(&self, callback: Option<CompletionCallback>) {
        let rejected = {
            let mut state = self.state.borrow_mut();
            if state.phase == GroupPhase::Disposed {
                callback
            } else {
                state.on_complete = callback;
                None
            }
        };

        if rejected.is_some() {
            tracing::warn!(
                "GroupAnimation: completion hook dropped ({}); the parent will not be notified",
                GroupError::Disposed
            );
        }
    }
}

// =============================================================================
// Play strategies
// =============================================================================

/// One child claimed by a sequential or interval cycle
struct Step {
    index: usize,
    child: SharedPlayable,
    is_last: bool,
    interval_ms: f64,
}

/// Everything a suspended continuation needs to resume its cycle
#[derive(Clone)]
struct CycleCtx {
    state: Weak<RefCell<GroupState>>,
    scheduler: SchedulerHandle,
    token: CancelToken,
    id: u64,
}

impl CycleCtx {
    /// The group state, if this cycle is still the one running
    fn current(&self) -> Option<Rc<RefCell<GroupState>>> {
        if self.token.is_cancelled() {
            return None;
        }

        let state = self.state.upgrade()?;
        let live = {
            let guard = state.borrow();
            guard.phase == GroupPhase::Playing
                && guard.cycle.as_ref().is_some_and(|cycle| cycle.id == self.id)
        };
        live.then_some(state)
    }

    /// Hook that completes the cycle when the designated child finishes
    fn completion_hook(&self) -> CompletionCallback {
        let ctx = self.clone();
        Box::new(move || {
            if let Some(state) = ctx.current() {
                complete_cycle(&state, ctx.id);
            }
        })
    }

    /// Claim the next child under the cursor
    fn next_child(&self, state: &Rc<RefCell<GroupState>>) -> Option<Step> {
        let mut guard = state.borrow_mut();
        let len = guard.children.len();
        let cycle = guard.cycle.as_mut()?;
        let index = cycle.cursor;
        if index >= len {
            return None;
        }
        cycle.cursor += 1;
        cycle.tick = None;
        let interval_ms = cycle.interval_ms;
        Some(Step {
            index,
            child: guard.children[index].clone(),
            is_last: index + 1 == len,
            interval_ms,
        })
    }
}

/// Emit completion: parent hook first, then subscribers
fn complete_cycle(state: &Rc<RefCell<GroupState>>, id: u64) {
    let (hook, listeners) = {
        let mut guard = state.borrow_mut();
        if let Some(cycle) = guard.cycle.take() {
            cycle.token.cancel();
        }
        guard.phase = GroupPhase::Completing;
        (guard.on_complete.take(), guard.events.snapshot())
    };

    tracing::debug!(cycle = id, "GroupAnimation: cycle complete");

    if let Some(hook) = hook {
        hook();
    }
    for listener in listeners {
        listener(&GroupEvent::Complete);
    }

    // A callback may already have replayed, stopped or disposed the group
    let mut guard = state.borrow_mut();
    if guard.phase == GroupPhase::Completing {
        guard.phase = GroupPhase::Idle;
    }
}

/// Start every child; the last declared one signals completion
fn play_together(ctx: &CycleCtx) {
    let Some(state) = ctx.current() else {
        return;
    };
    let children = state.borrow().children.clone();
    drop(state);

    let last = children.len().saturating_sub(1);
    for (index, child) in children.iter().enumerate() {
        // A child completing synchronously may have ended the cycle
        if ctx.current().is_none() {
            tracing::trace!(cycle = ctx.id, index, "GroupAnimation: together fan-out halted");
            return;
        }
        if index == last {
            child.set_on_complete(Some(ctx.completion_hook()));
        }
        child.play();
    }
}

/// Sequential continuation: start the next child, or complete
///
/// A child that completes inside its own `play()` re-enters here. The nested
/// call only flags the cycle and the outer call loops, so long runs of
/// synchronous children use constant stack.
fn advance_sequence(ctx: CycleCtx) {
    let Some(state) = ctx.current() else {
        tracing::trace!(cycle = ctx.id, "GroupAnimation: stale sequence step ignored");
        return;
    };

    {
        let mut guard = state.borrow_mut();
        let Some(cycle) = guard.cycle.as_mut() else {
            return;
        };
        if cycle.advancing {
            cycle.pending = true;
            return;
        }
        cycle.advancing = true;
    }

    let mut state = state;
    loop {
        let Some(step) = ctx.next_child(&state) else {
            complete_cycle(&state, ctx.id);
            return;
        };
        drop(state);

        tracing::trace!(cycle = ctx.id, index = step.index, "GroupAnimation: sequence advance");
        let next = ctx.clone();
        step.child
            .set_on_complete(Some(Box::new(move || advance_sequence(next))));
        step.child.play();

        // The cycle may have been cancelled from inside the child
        let Some(current) = ctx.current() else {
            return;
        };
        {
            let mut guard = current.borrow_mut();
            let Some(cycle) = guard.cycle.as_mut() else {
                return;
            };
            if !cycle.pending {
                cycle.advancing = false;
                return;
            }
            cycle.pending = false;
        }
        state = current;
    }
}

/// Interval tick: start the child under the cursor and queue the next tick
fn interval_tick(ctx: CycleCtx) {
    let Some(state) = ctx.current() else {
        tracing::trace!(cycle = ctx.id, "GroupAnimation: stale interval tick ignored");
        return;
    };

    let Some(step) = ctx.next_child(&state) else {
        return;
    };
    drop(state);

    tracing::trace!(cycle = ctx.id, index = step.index, "GroupAnimation: interval tick");
    if step.is_last {
        step.child.set_on_complete(Some(ctx.completion_hook()));
    }
    step.child.play();

    if step.is_last {
        return;
    }

    let next = ctx.clone();
    let Some(tick) = ctx
        .scheduler
        .set_timeout(step.interval_ms, move || interval_tick(next))
    else {
        tracing::warn!(
            cycle = ctx.id,
            "GroupAnimation: scheduler dropped, interval cycle cannot continue"
        );
        return;
    };

    // The child may have ended this cycle synchronously
    match ctx.current() {
        Some(state) => {
            if let Some(cycle) = state.borrow_mut().cycle.as_mut() {
                cycle.tick = Some(tick);
            }
        }
        None => {
            ctx.scheduler.clear_timeout(tick);
        }
    }
}
