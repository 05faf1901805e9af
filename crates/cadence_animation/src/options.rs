//! Group animation options
//!
//! [`GroupAnimationOptions`] is the effective configuration of a group.
//! [`GroupOptionsPatch`] is what callers hand to `set_options`: every field is
//! optional, and values are validated leniently. Unknown play types and
//! non-boolean `autoPlay` values are ignored; an interval that is not a
//! positive finite number falls back to [`DEFAULT_INTERVAL_MS`].
//!
//! Patches load from TOML or JSON with the same lenient rules:
//!
//! ```
//! use cadence_animation::{GroupOptionsPatch, PlayType};
//!
//! let patch = GroupOptionsPatch::from_toml_str(r#"
//!     playType = "interval"
//!     interval = 250
//!     autoPlay = "yes"      # not a boolean, ignored
//!     easing = "ease-out"   # unknown key, ignored
//! "#).unwrap();
//!
//! assert_eq!(patch.play_type, Some(PlayType::Interval));
//! assert_eq!(patch.interval, Some(250.0));
//! assert_eq!(patch.auto_play, None);
//! ```

use crate::error::{GroupError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interval used when none (or an invalid one) is configured
pub const DEFAULT_INTERVAL_MS: f64 = 100.0;

/// How a group plays its children
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayType {
    /// Start every child at once
    #[default]
    Together,
    /// Start each child when the previous one completes
    Sequential,
    /// Start children one by one, a fixed interval apart
    Interval,
}

impl PlayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayType::Together => "together",
            PlayType::Sequential => "sequential",
            PlayType::Interval => "interval",
        }
    }
}

impl fmt::Display for PlayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayType {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "together" => Ok(PlayType::Together),
            "sequential" => Ok(PlayType::Sequential),
            "interval" => Ok(PlayType::Interval),
            other => Err(GroupError::UnknownPlayType(other.to_string())),
        }
    }
}

/// Effective options of a group animation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupAnimationOptions {
    /// Composition strategy
    pub play_type: PlayType,
    /// Stagger between child starts in `interval` mode (ms, always > 0)
    pub interval: f64,
    /// Start playing as soon as options with `autoPlay: true` are applied
    pub auto_play: bool,
}

impl Default for GroupAnimationOptions {
    fn default() -> Self {
        Self {
            play_type: PlayType::Together,
            interval: DEFAULT_INTERVAL_MS,
            auto_play: false,
        }
    }
}

impl GroupAnimationOptions {
    /// Merge a patch into these options
    ///
    /// Returns true when the patch carried `autoPlay: true`.
    pub fn apply(&mut self, patch: &GroupOptionsPatch) -> bool {
        if let Some(play_type) = patch.play_type {
            self.play_type = play_type;
        }

        if let Some(interval) = patch.interval {
            self.interval = sanitize_interval(interval);
        }

        match patch.auto_play {
            Some(auto_play) => {
                self.auto_play = auto_play;
                auto_play
            }
            None => false,
        }
    }
}

/// Coerce a requested interval into a usable one
///
/// Positive finite values are kept; zero, negatives, NaN and infinities
/// become [`DEFAULT_INTERVAL_MS`].
pub fn sanitize_interval(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        DEFAULT_INTERVAL_MS
    }
}

/// Partial options accepted by `GroupAnimation::set_options`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupOptionsPatch {
    pub play_type: Option<PlayType>,
    /// Raw requested interval; coerced when applied
    pub interval: Option<f64>,
    pub auto_play: Option<bool>,
}

impl GroupOptionsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play_type(mut self, play_type: PlayType) -> Self {
        self.play_type = Some(play_type);
        self
    }

    pub fn interval(mut self, interval_ms: f64) -> Self {
        self.interval = Some(interval_ms);
        self
    }

    pub fn auto_play(mut self, auto_play: bool) -> Self {
        self.auto_play = Some(auto_play);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.play_type.is_none() && self.interval.is_none() && self.auto_play.is_none()
    }

    /// Load a patch from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: RawOptions = toml::from_str(source)?;
        Ok(raw.into())
    }

    /// Load a patch from a JSON document
    pub fn from_json_str(source: &str) -> Result<Self> {
        let raw: RawOptions = serde_json::from_str(source)?;
        Ok(raw.into())
    }

    /// Load a patch from an already-parsed JSON value
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawOptions = serde_json::from_value(value)?;
        Ok(raw.into())
    }
}

impl From<GroupAnimationOptions> for GroupOptionsPatch {
    fn from(options: GroupAnimationOptions) -> Self {
        Self {
            play_type: Some(options.play_type),
            interval: Some(options.interval),
            auto_play: Some(options.auto_play),
        }
    }
}

impl From<PlayType> for GroupOptionsPatch {
    fn from(play_type: PlayType) -> Self {
        Self::new().play_type(play_type)
    }
}

/// Any value a config document may hold for a known key
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Options document as written, before validation
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawOptions {
    #[serde(rename = "playType", alias = "play_type")]
    play_type: Option<LooseValue>,
    interval: Option<LooseValue>,
    #[serde(rename = "autoPlay", alias = "auto_play")]
    auto_play: Option<LooseValue>,
}

impl From<RawOptions> for GroupOptionsPatch {
    fn from(raw: RawOptions) -> Self {
        let play_type = match raw.play_type {
            Some(LooseValue::Text(name)) => match name.parse() {
                Ok(play_type) => Some(play_type),
                Err(err) => {
                    tracing::debug!("GroupOptionsPatch: ignoring playType ({})", err);
                    None
                }
            },
            _ => None,
        };

        // A present but non-numeric interval still resets to the default
        let interval = raw.interval.map(|value| match value {
            LooseValue::Number(ms) => ms,
            _ => f64::NAN,
        });

        let auto_play = match raw.auto_play {
            Some(LooseValue::Bool(flag)) => Some(flag),
            _ => None,
        };

        Self {
            play_type,
            interval,
            auto_play,
        }
    }
}
