//! Error types for warhola-core.
//!
//! # Usage
//!
//! ```rust
//! use warhola_core::{Error, Result};
//!
//! fn check(width: i32, height: i32) -> Result<()> {
//!     if width <= 0 || height <= 0 {
//!         return Err(Error::invalid_dimensions(width, height));
//!     }
//!     Ok(())
//! }
//! assert!(check(0, 4).is_err());
//! ```
//!
//! # Used By
//!
//! - [`crate::buffer::PixelBuffer`] - construction and conversions
//! - [`crate::layout::Layout`] - name parsing
//! - `warhola-ops` and `warhola-io` wrap this type in their own errors

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by pixel buffer and layout operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Width or height is zero or negative where a real size is required.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: i32,
        /// Requested height
        height: i32,
    },

    /// A region does not overlap the buffer it was applied to.
    #[error("empty intersect: {region} does not overlap {bounds}")]
    EmptyIntersect {
        /// Requested region
        region: String,
        /// Buffer bounds
        bounds: String,
    },

    /// The named color model is not one of the supported channel layouts.
    #[error("unsupported color model: {0}")]
    UnsupportedColorModel(String),

    /// A parameter value is outside its accepted range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: i32, height: i32) -> Self {
        Self::InvalidDimensions { width, height }
    }

    /// Creates an [`Error::EmptyIntersect`] error from anything printable.
    pub fn empty_intersect(region: impl std::fmt::Display, bounds: impl std::fmt::Display) -> Self {
        Self::EmptyIntersect {
            region: region.to_string(),
            bounds: bounds.to_string(),
        }
    }

    /// Creates an [`Error::UnsupportedColorModel`] error.
    pub fn unsupported_color_model(name: impl Into<String>) -> Self {
        Self::UnsupportedColorModel(name.into())
    }

    /// Returns `true` for [`Error::EmptyIntersect`].
    pub fn is_empty_intersect(&self) -> bool {
        matches!(self, Self::EmptyIntersect { .. })
    }

    /// Returns `true` for [`Error::InvalidDimensions`].
    pub fn is_invalid_dimensions(&self) -> bool {
        matches!(self, Self::InvalidDimensions { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::invalid_dimensions(0, 12);
        assert_eq!(err.to_string(), "invalid dimensions: 0x12");
        assert!(err.is_invalid_dimensions());

        let err = Error::unsupported_color_model("YCbCr");
        assert!(err.to_string().contains("YCbCr"));
    }

    #[test]
    fn test_empty_intersect() {
        let err = Error::empty_intersect("(20,20)-(30,30)", "(0,0)-(10,10)");
        assert!(err.is_empty_intersect());
        assert!(!err.is_invalid_dimensions());
    }
}
