//! Duration estimation
//!
//! Predicts how long a group takes to play without running it.
//!
//! - `together`: the slowest child
//! - `sequential`: the sum of all children
//! - `interval`: child `i` starts at `i * interval`. The stagger schedule
//!   spans `interval * n`; a child whose duration is longer than the time left
//!   in the schedule after its start overruns it. The group lasts the span
//!   plus the largest overrun.

use crate::options::PlayType;
use smallvec::SmallVec;

/// Aggregates of the child durations, computed in one pass
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DurationBreakdown {
    /// Longest child duration
    pub max: f64,
    /// Sum of child durations
    pub sum: f64,
    /// Nominal length of the stagger schedule (`interval * n`)
    pub span: f64,
    /// Largest amount by which a child outlives the stagger schedule
    pub overrun: f64,
}

impl DurationBreakdown {
    /// Compute the breakdown for children started `interval_ms` apart
    ///
    /// Negative and NaN child durations count as zero.
    pub fn compute<I>(durations: I, interval_ms: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let durations: SmallVec<[f64; 16]> =
            durations.into_iter().map(|d| d.max(0.0)).collect();
        let span = interval_ms * durations.len() as f64;

        let mut breakdown = DurationBreakdown {
            span,
            ..Default::default()
        };

        for (i, &duration) in durations.iter().enumerate() {
            let remaining = span - i as f64 * interval_ms;
            if duration > remaining {
                breakdown.overrun = breakdown.overrun.max(duration - remaining);
            }
            breakdown.max = breakdown.max.max(duration);
            breakdown.sum += duration;
        }

        breakdown
    }

    /// Total duration under the given strategy
    pub fn total(&self, play_type: PlayType) -> f64 {
        match play_type {
            PlayType::Together => self.max,
            PlayType::Sequential => self.sum,
            PlayType::Interval => self.span + self.overrun,
        }
    }
}

/// Estimate the total playback time of a group
pub fn estimate_duration<I>(durations: I, play_type: PlayType, interval_ms: f64) -> f64
where
    I: IntoIterator<Item = f64>,
{
    DurationBreakdown::compute(durations, interval_ms).total(play_type)
}
