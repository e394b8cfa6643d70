//! Error types for landmark decoding and rig configuration.

use thiserror::Error;

/// Reasons a landmark text frame is rejected.
///
/// These never reach the solver: [`crate::landmarks::LandmarkDecoder`] drops
/// the frame and keeps the previous one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Frame is not wrapped in `[` ... `]`.
    #[error("frame is not wrapped in brackets")]
    MissingBrackets,

    /// Fewer comma-separated values than a full hand needs.
    #[error("expected at least {expected} values, found {found}")]
    TooFewValues { expected: usize, found: usize },

    /// A token could not be parsed as a number.
    #[error("value {index} is not a number: {token:?}")]
    InvalidNumber { index: usize, token: String },

    /// A token parsed to NaN or infinity.
    #[error("value {index} is not finite")]
    NonFinite { index: usize },
}

/// Invalid rig configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Segment length must be a positive, finite number.
    #[error("invalid segment length for {name}: {value}")]
    InvalidLength { name: &'static str, value: f32 },

    /// Maximum reach must be a positive, finite number.
    #[error("invalid max reach: {0}")]
    InvalidReach(f32),

    /// Scale divisor must be a positive, finite number.
    #[error("invalid scale: {0}")]
    InvalidScale(f32),

    /// Generic invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
}

impl ConfigError {
    /// Create an InvalidParam error with a message.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Self::InvalidParam(msg.into())
    }
}
