//! Group animation error types

use thiserror::Error;

/// Errors surfaced by group animations
///
/// Invalid option values are never errors; they are coerced or ignored.
#[derive(Error, Debug)]
pub enum GroupError {
    /// The group was disposed and can no longer be used
    #[error("Group animation has been disposed")]
    Disposed,

    /// A play type name that is not `together`, `sequential` or `interval`
    #[error("Unknown play type: {0}")]
    UnknownPlayType(String),

    /// Options document is not valid TOML
    #[error("Failed to parse options TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Options document is not valid JSON
    #[error("Failed to parse options JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for group animation operations
pub type Result<T> = std::result::Result<T, GroupError>;
