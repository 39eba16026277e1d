//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpsError {
    /// Error raised by a pixel buffer.
    #[error(transparent)]
    Core(#[from] warhola_core::Error),

    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Requested region does not overlap the image.
    #[error("empty intersect: {0}")]
    EmptyIntersect(String),

    /// Blend position is neither foreground nor background.
    #[error("not a valid blend position: {0}")]
    UnsupportedBlendPosition(String),

    /// Blend mode name is not recognised.
    #[error("not a valid blend action: {0}")]
    UnsupportedBlendAction(String),

    /// Adjustment name is not recognised.
    #[error("not a valid adjustment: {0}")]
    UnsupportedAdjustment(String),

    /// Direction name is not recognised.
    #[error("not a valid direction: {0}")]
    UnsupportedDirection(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
