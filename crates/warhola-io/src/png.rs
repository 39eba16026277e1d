//! PNG format support.
//!
//! Decodes 8 and 16-bit gray, gray+alpha, RGB, RGBA and indexed images.
//! Indexed images are expanded and keep their color table as the buffer's
//! palette, so later writes snap to it.
//!
//! Encoding picks the narrowest color type that holds the buffer: gray for
//! gray layouts, RGB for opaque buffers, RGBA otherwise; 16-bit layouts are
//! written at 16 bits.

use std::io::Cursor;

use tracing::debug;
use warhola_core::{Color, Layout, Palette, PixelBuffer};

use crate::{IoError, IoResult};

/// Decodes a PNG stream.
pub fn decode(bytes: &[u8]) -> IoResult<PixelBuffer> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let table = indexed_table(reader.info());
    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let (w, h) = (dim(info.width)?, dim(info.height)?);
    debug!(w, h, color = ?info.color_type, depth = ?info.bit_depth, "png frame");

    let (layout, data) = match (info.color_type, info.bit_depth) {
        (png::ColorType::Grayscale, png::BitDepth::Eight) => (Layout::Gray8, buf),
        (png::ColorType::Grayscale, png::BitDepth::Sixteen) => (Layout::Gray16, buf),
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => (
            Layout::Nrgba32,
            buf.chunks_exact(2).flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]]).collect(),
        ),
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Sixteen) => (
            Layout::Nrgba64,
            buf.chunks_exact(4)
                .flat_map(|ga| [ga[0], ga[1], ga[0], ga[1], ga[0], ga[1], ga[2], ga[3]])
                .collect(),
        ),
        (png::ColorType::Rgb, png::BitDepth::Eight) => (
            Layout::Rgba32,
            buf.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 0xff]).collect(),
        ),
        (png::ColorType::Rgb, png::BitDepth::Sixteen) => (
            Layout::Rgba64,
            buf.chunks_exact(6)
                .flat_map(|p| [p[0], p[1], p[2], p[3], p[4], p[5], 0xff, 0xff])
                .collect(),
        ),
        (png::ColorType::Rgba, png::BitDepth::Eight) => (Layout::Nrgba32, buf),
        (png::ColorType::Rgba, png::BitDepth::Sixteen) => (Layout::Nrgba64, buf),
        (color_type, bit_depth) => {
            return Err(IoError::DecodeError(format!("unsupported PNG {color_type:?} {bit_depth:?}")));
        }
    };

    let mut out = PixelBuffer::from_raw(layout, w, h, data)?;
    if let Some(table) = table {
        debug!(entries = table.len(), "png palette");
        out.set_palette(Some(Palette::indexed(table)));
    }
    Ok(out)
}

/// Color table of an indexed image, with `tRNS` alpha applied.
fn indexed_table(info: &png::Info<'_>) -> Option<Vec<Color>> {
    if info.color_type != png::ColorType::Indexed {
        return None;
    }
    let plte = info.palette.as_ref()?;
    let trns = info.trns.as_deref().unwrap_or(&[]);
    Some(
        plte.chunks_exact(3)
            .enumerate()
            .map(|(i, p)| Color::Nrgba([p[0], p[1], p[2], trns.get(i).copied().unwrap_or(0xff)]))
            .collect(),
    )
}

pub(crate) fn dim(v: u32) -> IoResult<i32> {
    i32::try_from(v).map_err(|_| IoError::DecodeError(format!("dimension {v} out of range")))
}

/// Encodes a buffer as PNG.
pub fn encode(buf: &PixelBuffer) -> IoResult<Vec<u8>> {
    let (w, h) = (buf.width() as u32, buf.height() as u32);
    if w == 0 || h == 0 {
        return Err(IoError::EncodeError(format!("cannot encode {w}x{h} image")));
    }

    let (color, depth, data) = match buf.layout() {
        Layout::Gray8 if buf.palette().is_none() => (png::ColorType::Grayscale, png::BitDepth::Eight, buf.packed()),
        Layout::Gray16 if buf.palette().is_none() => (png::ColorType::Grayscale, png::BitDepth::Sixteen, buf.packed()),
        l if l.is_wide() => {
            let px = buf.clone_to(Layout::Nrgba64);
            if px.is_opaque() {
                let rgb = px.packed().chunks_exact(8).flat_map(|p| p[..6].to_vec()).collect();
                (png::ColorType::Rgb, png::BitDepth::Sixteen, rgb)
            } else {
                (png::ColorType::Rgba, png::BitDepth::Sixteen, px.packed())
            }
        }
        _ => {
            let px = buf.clone_to(Layout::Nrgba32);
            if px.is_opaque() {
                let rgb = px.packed().chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect();
                (png::ColorType::Rgb, png::BitDepth::Eight, rgb)
            } else {
                (png::ColorType::Rgba, png::BitDepth::Eight, px.packed())
            }
        }
    };
    debug!(w, h, ?color, ?depth, "png encode");

    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, w, h);
    encoder.set_color(color);
    encoder.set_depth(depth);
    encoder.set_compression(png::Compression::default());

    let mut writer = encoder.write_header().map_err(|e| IoError::EncodeError(e.to_string()))?;
    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    writer.finish().map_err(|e| IoError::EncodeError(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_rgba() {
        let mut buf = PixelBuffer::scratch(Layout::Nrgba32, 16, 8).unwrap();
        for y in 0..8 {
            for x in 0..16 {
                buf.set(x, y, Color::Nrgba([(x * 16) as u8, (y * 32) as u8, 64, 128]));
            }
        }
        let bytes = encode(&buf).unwrap();
        let loaded = decode(&bytes).unwrap();
        assert_eq!(loaded.layout(), Layout::Nrgba32);
        assert_eq!(loaded.packed(), buf.packed());
    }

    #[test]
    fn test_opaque_decodes_as_rgba() {
        let mut buf = PixelBuffer::scratch(Layout::Rgba32, 4, 4).unwrap();
        buf.fill(Color::Rgba([10, 20, 30, 255]));
        let loaded = decode(&encode(&buf).unwrap()).unwrap();
        assert_eq!(loaded.layout(), Layout::Rgba32);
        assert_eq!(loaded.at(3, 3), Color::Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_gray16_kept() {
        let mut buf = PixelBuffer::scratch(Layout::Gray16, 3, 2).unwrap();
        buf.set(1, 1, Color::Gray16(0x1234));
        let loaded = decode(&encode(&buf).unwrap()).unwrap();
        assert_eq!(loaded.layout(), Layout::Gray16);
        assert_eq!(loaded.at(1, 1), Color::Gray16(0x1234));
    }

    #[test]
    fn test_indexed_sets_palette() {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, 2, 1);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_palette(vec![255, 0, 0, 0, 0, 255]);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[1, 0]).unwrap();
            writer.finish().unwrap();
        }
        let loaded = decode(&bytes).unwrap();
        assert_eq!(loaded.at(0, 0), Color::Rgba([0, 0, 255, 255]));
        assert_eq!(loaded.at(1, 0), Color::Rgba([255, 0, 0, 255]));
        assert!(loaded.palette().is_some());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(decode(b"not a png"), Err(IoError::DecodeError(_))));
        assert!(encode(&PixelBuffer::empty()).is_err());
    }
}
