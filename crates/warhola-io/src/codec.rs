//! Encode/decode seam between pixel buffers and file bytes.
//!
//! [`Codec`] is the only place bytes are inspected. [`StandardCodec`] covers
//! PNG, JPEG, BMP and TIFF.
//!
//! # Example
//!
//! ```rust
//! use warhola_core::{Layout, PixelBuffer};
//! use warhola_io::{Codec, Format, StandardCodec};
//!
//! let buf = PixelBuffer::scratch(Layout::Rgba32, 4, 4).unwrap();
//! let codec = StandardCodec::default();
//! let bytes = codec.encode(&buf, Format::Bmp).unwrap();
//! let (back, format) = codec.decode(&bytes).unwrap();
//! assert_eq!(format, Format::Bmp);
//! assert_eq!(back.rect(), buf.rect());
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, trace};
use warhola_core::PixelBuffer;

use crate::{Format, IoError, IoResult, bmp, jpeg, png, tiff};

/// Converts between pixel buffers and encoded image bytes.
pub trait Codec: Send + Sync {
    /// Decodes `bytes`, reporting the detected format.
    fn decode(&self, bytes: &[u8]) -> IoResult<(PixelBuffer, Format)>;

    /// Encodes `buf` as `format`.
    fn encode(&self, buf: &PixelBuffer, format: Format) -> IoResult<Vec<u8>>;

    /// Reads and decodes a file.
    fn read(&self, path: &Path) -> IoResult<(PixelBuffer, Format)> {
        trace!(path = %path.display(), "read");
        let bytes = fs::read(path)?;
        self.decode(&bytes)
    }

    /// Encodes and writes a file, replacing any existing one.
    fn write(&self, path: &Path, buf: &PixelBuffer, format: Format) -> IoResult<()> {
        trace!(path = %path.display(), %format, "write");
        let bytes = self.encode(buf, format)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Built-in codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardCodec {
    /// JPEG encoder quality, 1 to 100.
    pub jpeg_quality: u8,
}

impl StandardCodec {
    /// Codec with a custom JPEG quality.
    pub fn with_jpeg_quality(quality: u8) -> Self {
        Self {
            jpeg_quality: quality.clamp(1, 100),
        }
    }
}

impl Default for StandardCodec {
    fn default() -> Self {
        Self {
            jpeg_quality: jpeg::DEFAULT_QUALITY,
        }
    }
}

impl Codec for StandardCodec {
    fn decode(&self, bytes: &[u8]) -> IoResult<(PixelBuffer, Format)> {
        let format = Format::from_bytes(bytes)
            .ok_or_else(|| IoError::UnsupportedFormat("unrecognised image signature".into()))?;
        debug!(%format, len = bytes.len(), "decode");
        let buf = match format {
            Format::Png => png::decode(bytes)?,
            Format::Jpeg => jpeg::decode(bytes)?,
            Format::Bmp => bmp::decode(bytes)?,
            Format::Tiff => tiff::decode(bytes)?,
        };
        Ok((buf, format))
    }

    fn encode(&self, buf: &PixelBuffer, format: Format) -> IoResult<Vec<u8>> {
        debug!(%format, layout = %buf.layout(), "encode");
        match format {
            Format::Png => png::encode(buf),
            Format::Jpeg => jpeg::encode(buf, self.jpeg_quality),
            Format::Bmp => bmp::encode(buf),
            Format::Tiff => tiff::encode(buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warhola_core::{Color, Layout};

    #[test]
    fn test_every_format_decodes_its_own_output() {
        let mut buf = PixelBuffer::scratch(Layout::Rgba32, 6, 4).unwrap();
        buf.fill(Color::Rgba([250, 130, 10, 255]));
        let codec = StandardCodec::default();
        for format in Format::ALL {
            let bytes = codec.encode(&buf, format).unwrap();
            let (back, detected) = codec.decode(&bytes).unwrap();
            assert_eq!(detected, format);
            assert_eq!((back.width(), back.height()), (6, 4), "{format}");
        }
    }

    #[test]
    fn test_unknown_bytes() {
        let err = StandardCodec::default().decode(b"GIF89a....").unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(_)));
        assert_eq!(StandardCodec::with_jpeg_quality(0).jpeg_quality, 1);
    }
}
