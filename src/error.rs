//! Crate error type.
//!
//! Only structural misuse surfaces here. Recoverable situations (missing prior
//! candidate sets, untried arms, degenerate discounted totals) are absorbed by
//! the scoring and adaptation code and never produce an `Error`.

use crate::{Arm, Condition};

/// Errors returned by `iwtune`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A condition was scored with no observations.
    #[error("no observations for condition {condition}")]
    EmptyHistory { condition: Condition },

    /// A condition component was NaN or infinite.
    #[error("condition {field} must be finite, got {value}")]
    InvalidCondition { field: &'static str, value: f64 },

    /// A condition key could not be parsed.
    #[error("invalid condition key {0:?}")]
    InvalidKey(String),

    /// A reward was negative or non-finite.
    #[error("invalid reward {reward} for arm {arm} under condition {condition}")]
    InvalidReward {
        condition: Condition,
        arm: Arm,
        reward: f64,
    },

    /// A configuration value was out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A persisted artifact could not be read or written.
    #[error("json: {0}")]
    Json(String),
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
