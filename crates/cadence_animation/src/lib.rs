//! Cadence Animation
//!
//! Group orchestration for animations that finish on their own schedule.
//!
//! # Features
//!
//! - **Group Animations**: play children together, one after another, or
//!   staggered by a fixed interval
//! - **Nesting**: groups are playable themselves and compose freely
//! - **Duration Estimation**: predict a group's length without running it
//! - **Lenient Options**: patches from code, TOML or JSON, with invalid values
//!   coerced instead of rejected
//! - **Timed Animations**: fixed-duration leaves driven by the scheduler clock

pub mod duration;
pub mod error;
pub mod group;
pub mod options;
pub mod playable;
pub mod timed;

pub use duration::{estimate_duration, DurationBreakdown};
pub use error::{GroupError, Result};
pub use group::{GroupAnimation, GroupEvent, GroupPhase};
pub use options::{
    sanitize_interval, GroupAnimationOptions, GroupOptionsPatch, PlayType, DEFAULT_INTERVAL_MS,
};
pub use playable::{CompletionCallback, Playable, SharedPlayable};
pub use timed::{TimedAnimation, TimedState};
