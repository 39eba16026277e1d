//! JPEG format support.
//!
//! Decoding keeps gray and CMYK images in their own layouts. Encoding writes
//! gray layouts as luma, CMYK as CMYK and everything else as RGB with alpha
//! dropped.

use std::io::{BufReader, Cursor};

use tracing::debug;
use warhola_core::{Layout, PixelBuffer};

use crate::{IoError, IoResult};

/// Default encoder quality.
pub const DEFAULT_QUALITY: u8 = 100;

/// Decodes a JPEG stream.
pub fn decode(bytes: &[u8]) -> IoResult<PixelBuffer> {
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(Cursor::new(bytes)));
    let pixels = decoder.decode().map_err(|e| IoError::DecodeError(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;
    let (w, h) = (info.width as i32, info.height as i32);
    debug!(w, h, format = ?info.pixel_format, "jpeg frame");

    let (layout, data) = match info.pixel_format {
        jpeg_decoder::PixelFormat::L8 => (Layout::Gray8, pixels),
        jpeg_decoder::PixelFormat::L16 => (Layout::Gray16, pixels),
        jpeg_decoder::PixelFormat::RGB24 => (
            Layout::Rgba32,
            pixels.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 0xff]).collect(),
        ),
        jpeg_decoder::PixelFormat::CMYK32 => (Layout::Cmyk32, pixels),
    };
    Ok(PixelBuffer::from_raw(layout, w, h, data)?)
}

/// Encodes a buffer as JPEG at `quality` (1..=100).
pub fn encode(buf: &PixelBuffer, quality: u8) -> IoResult<Vec<u8>> {
    use jpeg_encoder::{ColorType, Encoder};

    let (w, h) = (buf.width(), buf.height());
    if w <= 0 || h <= 0 || w > u16::MAX as i32 || h > u16::MAX as i32 {
        return Err(IoError::EncodeError(format!("cannot encode {w}x{h} image as JPEG")));
    }

    let (color, data) = match buf.layout() {
        Layout::Gray8 | Layout::Gray16 => (ColorType::Luma, buf.clone_to(Layout::Gray8).packed()),
        Layout::Cmyk32 => (ColorType::Cmyk, buf.clone_to(Layout::Cmyk32).packed()),
        _ => {
            let rgba = buf.clone_to(Layout::Rgba32).packed();
            (ColorType::Rgb, rgba.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect())
        }
    };
    debug!(w, h, ?color, quality, "jpeg encode");

    let mut out = Vec::new();
    let encoder = Encoder::new(&mut out, quality.clamp(1, 100));
    encoder
        .encode(&data, w as u16, h as u16, color)
        .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;
    Ok(out)
}
