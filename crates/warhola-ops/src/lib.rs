//! # warhola-ops
//!
//! Stateless operators over [`PixelBuffer`]s.
//!
//! Every operator takes a source buffer and returns a new one. The source is
//! cloned into the RGBA32 working layout, the result is computed into a
//! fresh buffer, and that buffer is converted back into the source layout.
//! Row loops run on an [`Executor`].
//!
//! # Modules
//!
//! - [`adjust`] - brightness, contrast, gamma, hue, saturation
//! - [`blend`] - seventeen blend modes with alpha compositing
//! - [`convolve`] - kernel convolution and blurs
//! - [`resample`] - resampling filter table
//! - [`resize`] - nearest and separable filtered scaling
//! - [`transform`] - crop, rotate, shear, flip, translate
//! - [`stats`] - channel extraction, thresholding, histograms
//! - [`parallel`] - row-partitioned executor
//!
//! # Example
//!
//! ```rust
//! use warhola_core::{Color, Layout, PixelBuffer};
//! use warhola_ops::{Executor, ResampleFilter, resize::resize, transform::{flip, Direction}};
//!
//! let mut buf = PixelBuffer::scratch(Layout::Rgba32, 8, 8).unwrap();
//! buf.fill(Color::WHITE);
//!
//! let exec = Executor::default();
//! let small = resize(&exec, &buf, 4, 4, &ResampleFilter::LANCZOS).unwrap();
//! let flipped = flip(&exec, &small, Direction::Horizontal).unwrap();
//! assert_eq!(flipped.rect().dx(), 4);
//! ```
//!
//! [`PixelBuffer`]: warhola_core::PixelBuffer

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod adjust;
pub mod blend;
pub mod convolve;
pub mod parallel;
pub mod resample;
pub mod resize;
pub mod stats;
pub mod transform;

pub use adjust::Adjustment;
pub use blend::{BlendMode, BlendPosition};
pub use convolve::{BlurKind, Kernel};
pub use error::{OpsError, OpsResult};
pub use parallel::Executor;
pub use resample::ResampleFilter;
pub use transform::Direction;

use warhola_core::PixelBuffer;

/// Converts a working-layout result back into the layout of `src`.
pub(crate) fn restore(dst: PixelBuffer, src: &PixelBuffer) -> PixelBuffer {
    if dst.layout() == src.layout() && dst.palette().is_none() {
        dst
    } else {
        dst.clone_to(src.layout())
    }
}
