//! # warhola-core
//!
//! Pixel buffers and the types every other warhola crate builds on:
//!
//! - [`Layout`] - channel layout registry (nine layouts plus an unset sentinel)
//! - [`Color`], [`Rgbaf`] - layout-native and float colors, HSL/HSV helpers
//! - [`PixelBuffer`] - addressable, copy-on-write rectangle of pixel bytes
//! - [`Palette`] - write hook snapping colors to a table
//! - [`Measure`], [`Point`], [`Unit`] - physical units and named anchors
//! - [`Rect`] - half-open integer rectangles
//! - [`Error`] - error type
//!
//! ## Crate Structure
//!
//! ```text
//! warhola-core (this crate)
//!    ^
//!    +-- warhola-ops (adjust, blend, convolve, resize, transform)
//!    +-- warhola-io  (codecs, canvas)
//!    +-- warhola-cli
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod color;
pub mod error;
pub mod layout;
pub mod measure;
pub mod palette;
pub mod rect;

pub use buffer::{PadMode, PixelBuffer};
pub use color::{Color, Rgbaf, hsl_to_rgb, hsv_to_rgb, rgb_to_cmyk, rgb_to_hsl, rgb_to_hsv};
pub use error::{Error, Result};
pub use layout::Layout;
pub use measure::{AnchorFn, DEFAULT_PP, Measure, Point, Unit};
pub use palette::Palette;
pub use rect::Rect;

/// Prelude module for convenient imports.
///
/// ```
/// use warhola_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::{PadMode, PixelBuffer};
    pub use crate::color::{Color, Rgbaf};
    pub use crate::error::{Error, Result};
    pub use crate::layout::Layout;
    pub use crate::measure::{Measure, Point, Unit};
    pub use crate::rect::Rect;
}
