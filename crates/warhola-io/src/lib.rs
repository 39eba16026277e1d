//! # warhola-io
//!
//! Image codecs and the file-backed [`Canvas`].
//!
//! # Supported Formats
//!
//! | Format | Read | Write | Notes |
//! |--------|------|-------|-------|
//! | PNG    | Yes  | Yes   | 8/16-bit gray, gray+alpha, RGB, RGBA; indexed keeps its palette |
//! | JPEG   | Yes  | Yes   | gray, RGB, CMYK; alpha is dropped on write |
//! | BMP    | Yes  | Yes   | 8-bit indexed, 24/32-bit uncompressed |
//! | TIFF   | Yes  | Yes   | 8/16-bit gray, RGB, RGBA, 8-bit CMYK; uncompressed on write |
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use warhola_io::{Codec, Format, StandardCodec};
//!
//! let codec = StandardCodec::default();
//! let (buf, format) = codec.read(Path::new("input.png")).unwrap();
//! println!("{format}: {}x{}", buf.width(), buf.height());
//! codec.write(Path::new("output.bmp"), &buf, Format::Bmp).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod bmp;
pub mod canvas;
pub mod codec;
pub mod detect;
pub mod jpeg;
pub mod png;
pub mod tiff;

pub use canvas::{Action, Canvas, CanvasBuilder, Diagnostics};
pub use codec::{Codec, StandardCodec};
pub use detect::Format;
pub use error::{IoError, IoResult};
