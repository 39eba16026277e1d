//! TIFF format support.
//!
//! Reads 8 and 16-bit gray, RGB, RGBA and 8-bit CMYK. Writes uncompressed
//! strips: gray layouts as gray, CMYK as CMYK, 16-bit layouts as 16-bit
//! RGBA and everything else as 8-bit RGBA.

use std::io::Cursor;

use tracing::debug;
use warhola_core::{Layout, PixelBuffer};

use crate::png::dim;
use crate::{IoError, IoResult};

fn decode_err(e: tiff::TiffError) -> IoError {
    IoError::DecodeError(e.to_string())
}

fn encode_err(e: tiff::TiffError) -> IoError {
    IoError::EncodeError(e.to_string())
}

fn be_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn be_words(bytes: &[u8]) -> Vec<u16> {
    bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect()
}

/// Decodes a TIFF stream (first image only).
pub fn decode(bytes: &[u8]) -> IoResult<PixelBuffer> {
    use tiff::ColorType;
    use tiff::decoder::{Decoder, DecodingResult};

    let mut decoder = Decoder::new(Cursor::new(bytes)).map_err(decode_err)?;
    let (w, h) = decoder.dimensions().map_err(decode_err)?;
    let color_type = decoder.colortype().map_err(decode_err)?;
    debug!(w, h, ?color_type, "tiff image");
    let result = decoder.read_image().map_err(decode_err)?;

    let (layout, data) = match (color_type, result) {
        (ColorType::Gray(8), DecodingResult::U8(buf)) => (Layout::Gray8, buf),
        (ColorType::Gray(16), DecodingResult::U16(buf)) => (Layout::Gray16, be_bytes(&buf)),
        (ColorType::RGB(8), DecodingResult::U8(buf)) => (
            Layout::Rgba32,
            buf.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 0xff]).collect(),
        ),
        (ColorType::RGB(16), DecodingResult::U16(buf)) => (
            Layout::Rgba64,
            buf.chunks_exact(3)
                .flat_map(|p| be_bytes(&[p[0], p[1], p[2], 0xffff]))
                .collect(),
        ),
        (ColorType::RGBA(8), DecodingResult::U8(buf)) => (Layout::Nrgba32, buf),
        (ColorType::RGBA(16), DecodingResult::U16(buf)) => (Layout::Nrgba64, be_bytes(&buf)),
        (ColorType::CMYK(8), DecodingResult::U8(buf)) => (Layout::Cmyk32, buf),
        (ct, _) => {
            return Err(IoError::UnsupportedFormat(format!("TIFF color type {ct:?}")));
        }
    };
    Ok(PixelBuffer::from_raw(layout, dim(w)?, dim(h)?, data)?)
}

/// Encodes a buffer as an uncompressed TIFF.
pub fn encode(buf: &PixelBuffer) -> IoResult<Vec<u8>> {
    use tiff::encoder::{TiffEncoder, colortype};

    let (w, h) = (buf.width() as u32, buf.height() as u32);
    if w == 0 || h == 0 {
        return Err(IoError::EncodeError(format!("cannot encode {w}x{h} image")));
    }

    let layout = if buf.palette().is_some() { Layout::Nrgba32 } else { buf.layout() };
    debug!(w, h, %layout, "tiff encode");

    let mut out = Cursor::new(Vec::new());
    let mut encoder = TiffEncoder::new(&mut out).map_err(encode_err)?;
    match layout {
        Layout::Gray8 => encoder.write_image::<colortype::Gray8>(w, h, &buf.packed()),
        Layout::Gray16 => encoder.write_image::<colortype::Gray16>(w, h, &be_words(&buf.packed())),
        Layout::Cmyk32 => encoder.write_image::<colortype::CMYK8>(w, h, &buf.packed()),
        l if l.is_wide() => {
            let px = be_words(&buf.clone_to(Layout::Nrgba64).packed());
            encoder.write_image::<colortype::RGBA16>(w, h, &px)
        }
        _ => encoder.write_image::<colortype::RGBA8>(w, h, &buf.clone_to(Layout::Nrgba32).packed()),
    }
    .map_err(encode_err)?;
    drop(encoder);

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use warhola_core::Color;

    #[test]
    fn test_roundtrip_rgba8() {
        let mut buf = PixelBuffer::scratch(Layout::Nrgba32, 7, 5).unwrap();
        for y in 0..5 {
            for x in 0..7 {
                buf.set(x, y, Color::Nrgba([x as u8 * 30, y as u8 * 40, 99, 200]));
            }
        }
        let loaded = decode(&encode(&buf).unwrap()).unwrap();
        assert_eq!(loaded.layout(), Layout::Nrgba32);
        assert_eq!(loaded.packed(), buf.packed());
    }

    #[test]
    fn test_roundtrip_wide() {
        let mut buf = PixelBuffer::scratch(Layout::Nrgba64, 2, 2).unwrap();
        buf.fill(Color::Nrgba64([0x0102, 0x0304, 0x0506, 0x8000]));
        let loaded = decode(&encode(&buf).unwrap()).unwrap();
        assert_eq!(loaded.layout(), Layout::Nrgba64);
        assert_eq!(loaded.at(1, 1), Color::Nrgba64([0x0102, 0x0304, 0x0506, 0x8000]));
    }

    #[test]
    fn test_gray_and_cmyk_keep_layout() {
        let mut gray = PixelBuffer::scratch(Layout::Gray16, 3, 3).unwrap();
        gray.fill(Color::Gray16(0xabcd));
        let loaded = decode(&encode(&gray).unwrap()).unwrap();
        assert_eq!(loaded.at(2, 2), Color::Gray16(0xabcd));

        let mut cmyk = PixelBuffer::scratch(Layout::Cmyk32, 3, 3).unwrap();
        cmyk.fill(Color::Cmyk([1, 2, 3, 4]));
        let loaded = decode(&encode(&cmyk).unwrap()).unwrap();
        assert_eq!(loaded.layout(), Layout::Cmyk32);
        assert_eq!(loaded.at(0, 0), Color::Cmyk([1, 2, 3, 4]));
    }
}
