//! Windows bitmap support.
//!
//! Reads uncompressed 8-bit indexed, 24-bit and 32-bit bitmaps, bottom-up or
//! top-down. Writes 24-bit for opaque buffers and 32-bit BGRA otherwise,
//! always bottom-up. A 32-bit file whose alpha bytes are all zero is treated
//! as opaque.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::debug;
use warhola_core::{Layout, PixelBuffer, Unit};

use crate::{IoError, IoResult};

const FILE_HEADER_LEN: u32 = 14;
const INFO_HEADER_LEN: u32 = 40;
const BI_RGB: u32 = 0;
const BI_BITFIELDS: u32 = 3;

fn row_len(width: usize, bpp: usize) -> usize {
    (width * bpp).div_ceil(32) * 4
}

fn bad(msg: impl Into<String>) -> IoError {
    IoError::DecodeError(msg.into())
}

/// Decodes a BMP stream.
pub fn decode(bytes: &[u8]) -> IoResult<PixelBuffer> {
    let mut r = Cursor::new(bytes);
    let mut magic = [0u8; 2];
    r.read_exact(&mut magic)?;
    if &magic != b"BM" {
        return Err(bad("missing BM signature"));
    }
    let _file_size = r.read_u32::<LittleEndian>()?;
    let _reserved = r.read_u32::<LittleEndian>()?;
    let offset = r.read_u32::<LittleEndian>()?;

    let header_len = r.read_u32::<LittleEndian>()?;
    if header_len < INFO_HEADER_LEN {
        return Err(bad(format!("unsupported header size {header_len}")));
    }
    let width = r.read_i32::<LittleEndian>()?;
    let raw_height = r.read_i32::<LittleEndian>()?;
    let _planes = r.read_u16::<LittleEndian>()?;
    let bpp = r.read_u16::<LittleEndian>()? as usize;
    let compression = r.read_u32::<LittleEndian>()?;
    let _image_size = r.read_u32::<LittleEndian>()?;
    let _xppm = r.read_i32::<LittleEndian>()?;
    let _yppm = r.read_i32::<LittleEndian>()?;
    let colors_used = r.read_u32::<LittleEndian>()?;

    let top_down = raw_height < 0;
    let height = raw_height.checked_abs().ok_or_else(|| bad("height out of range"))?;
    if width <= 0 || height == 0 {
        return Err(bad(format!("invalid size {width}x{raw_height}")));
    }
    debug!(width, height, bpp, compression, top_down, "bmp header");

    let supported = matches!((bpp, compression), (8, BI_RGB) | (24, BI_RGB) | (32, BI_RGB) | (32, BI_BITFIELDS));
    if !supported {
        return Err(IoError::UnsupportedFormat(format!("BMP {bpp}-bit compression {compression}")));
    }

    let mut table = Vec::new();
    if bpp == 8 {
        let n = if colors_used == 0 { 256 } else { colors_used.min(256) };
        r.seek(SeekFrom::Start((FILE_HEADER_LEN + header_len) as u64))?;
        for _ in 0..n {
            let mut bgrx = [0u8; 4];
            r.read_exact(&mut bgrx)?;
            table.push([bgrx[2], bgrx[1], bgrx[0]]);
        }
    }

    let (w, h) = (width as usize, height as usize);
    let stride = row_len(w, bpp);
    let start = offset as usize;
    let end = start + stride * h;
    let pixels = bytes.get(start..end).ok_or_else(|| bad("truncated pixel data"))?;

    let mut data = vec![0u8; w * h * 4];
    for (y, dst) in data.chunks_exact_mut(w * 4).enumerate() {
        let sy = if top_down { y } else { h - 1 - y };
        let src = &pixels[sy * stride..sy * stride + stride];
        for (x, d) in dst.chunks_exact_mut(4).enumerate() {
            let px = match bpp {
                8 => {
                    let [r, g, b] = table.get(src[x] as usize).copied().unwrap_or([0, 0, 0]);
                    [r, g, b, 0xff]
                }
                24 => [src[x * 3 + 2], src[x * 3 + 1], src[x * 3], 0xff],
                _ => [src[x * 4 + 2], src[x * 4 + 1], src[x * 4], src[x * 4 + 3]],
            };
            d.copy_from_slice(&px);
        }
    }

    if bpp == 32 && data.chunks_exact(4).all(|p| p[3] == 0) {
        for p in data.chunks_exact_mut(4) {
            p[3] = 0xff;
        }
    }
    let layout = if bpp == 32 { Layout::Nrgba32 } else { Layout::Rgba32 };
    Ok(PixelBuffer::from_raw(layout, width, height, data)?)
}

/// Encodes a buffer as BMP.
pub fn encode(buf: &PixelBuffer) -> IoResult<Vec<u8>> {
    let (w, h) = (buf.width(), buf.height());
    if w <= 0 || h <= 0 {
        return Err(IoError::EncodeError(format!("cannot encode {w}x{h} image")));
    }
    let px = buf.clone_to(Layout::Nrgba32);
    let opaque = px.is_opaque();
    let bpp: usize = if opaque { 24 } else { 32 };
    let stride = row_len(w as usize, bpp);
    let image_size = (stride * h as usize) as u32;
    let offset = FILE_HEADER_LEN + INFO_HEADER_LEN;
    let ppm = (buf.measure().pp(Unit::Centimeter) * 100.0).round() as i32;
    debug!(w, h, bpp, "bmp encode");

    let mut out = Vec::with_capacity((offset + image_size) as usize);
    out.write_all(b"BM")?;
    out.write_u32::<LittleEndian>(offset + image_size)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(offset)?;

    out.write_u32::<LittleEndian>(INFO_HEADER_LEN)?;
    out.write_i32::<LittleEndian>(w)?;
    out.write_i32::<LittleEndian>(h)?;
    out.write_u16::<LittleEndian>(1)?;
    out.write_u16::<LittleEndian>(bpp as u16)?;
    out.write_u32::<LittleEndian>(BI_RGB)?;
    out.write_u32::<LittleEndian>(image_size)?;
    out.write_i32::<LittleEndian>(ppm)?;
    out.write_i32::<LittleEndian>(ppm)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(0)?;

    let mut row = vec![0u8; stride];
    for y in (0..h as usize).rev() {
        row.fill(0);
        for (x, p) in px.row(y).chunks_exact(4).enumerate() {
            if opaque {
                row[x * 3..x * 3 + 3].copy_from_slice(&[p[2], p[1], p[0]]);
            } else {
                row[x * 4..x * 4 + 4].copy_from_slice(&[p[2], p[1], p[0], p[3]]);
            }
        }
        out.write_all(&row)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warhola_core::Color;

    fn sample(alpha: u8) -> PixelBuffer {
        let mut buf = PixelBuffer::scratch(Layout::Nrgba32, 5, 3).unwrap();
        for y in 0..3 {
            for x in 0..5 {
                buf.set(x, y, Color::Nrgba([x as u8 * 50, y as u8 * 80, 7, alpha]));
            }
        }
        buf
    }

    #[test]
    fn test_roundtrip_opaque() {
        let buf = sample(255);
        let bytes = encode(&buf).unwrap();
        // 5 px * 3 bytes padded to 16 per row
        assert_eq!(bytes.len(), 54 + 16 * 3);
        let loaded = decode(&bytes).unwrap();
        assert_eq!(loaded.layout(), Layout::Rgba32);
        assert_eq!(loaded.clone_to(Layout::Nrgba32).packed(), buf.packed());
    }

    #[test]
    fn test_roundtrip_alpha() {
        let buf = sample(100);
        let loaded = decode(&encode(&buf).unwrap()).unwrap();
        assert_eq!(loaded.layout(), Layout::Nrgba32);
        assert_eq!(loaded.packed(), buf.packed());
    }

    #[test]
    fn test_top_down() {
        let mut bytes = encode(&sample(255)).unwrap();
        // negate the height and reverse the rows
        bytes[22..26].copy_from_slice(&(-3i32).to_le_bytes());
        let rows: Vec<Vec<u8>> = bytes[54..].chunks(16).map(|r| r.to_vec()).collect();
        let flipped: Vec<u8> = rows.into_iter().rev().flatten().collect();
        bytes[54..].copy_from_slice(&flipped);
        let loaded = decode(&bytes).unwrap();
        assert_eq!(loaded.at(4, 2), Color::Rgba([200, 160, 7, 255]));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(decode(b"XX").is_err());
        let mut bytes = encode(&sample(255)).unwrap();
        bytes.truncate(60);
        assert!(matches!(decode(&bytes), Err(IoError::DecodeError(_))));
    }
}
