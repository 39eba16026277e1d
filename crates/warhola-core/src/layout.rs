//! Channel layout registry.
//!
//! A [`Layout`] describes how one pixel is stored in a byte buffer: how many
//! bytes it takes, the channel order and whether values are 8 or 16 bit
//! (16-bit channels are big-endian). Dispatch over layouts is a plain
//! `match`; there is one arm per layout in each operation below.
//!
//! | Layout    | bytes | channels            |
//! |-----------|-------|---------------------|
//! | `Alpha8`  | 1     | a                   |
//! | `Alpha16` | 2     | a                   |
//! | `Gray8`   | 1     | y                   |
//! | `Gray16`  | 2     | y                   |
//! | `Cmyk32`  | 4     | c m y k             |
//! | `Rgba32`  | 4     | r g b a (premul)    |
//! | `Rgba64`  | 8     | r g b a (premul)    |
//! | `Nrgba32` | 4     | r g b a (straight)  |
//! | `Nrgba64` | 8     | r g b a (straight)  |
//!
//! [`Layout::Unset`] is a sentinel: zero bytes wide, reads transparent black
//! and ignores writes.

use std::fmt;
use std::str::FromStr;

use crate::color::Color;
use crate::error::Error;

/// Pixel channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    /// No layout; degenerate buffers only.
    #[default]
    Unset,
    /// 8-bit alpha
    Alpha8,
    /// 16-bit alpha
    Alpha16,
    /// 8-bit cyan, magenta, yellow, key
    Cmyk32,
    /// 8-bit gray
    Gray8,
    /// 16-bit gray
    Gray16,
    /// 8-bit straight-alpha RGBA
    Nrgba32,
    /// 16-bit straight-alpha RGBA
    Nrgba64,
    /// 8-bit premultiplied RGBA
    Rgba32,
    /// 16-bit premultiplied RGBA
    Rgba64,
}

impl Layout {
    /// Every real layout, in registry order.
    pub const ALL: [Layout; 9] = [
        Layout::Alpha8,
        Layout::Alpha16,
        Layout::Cmyk32,
        Layout::Gray8,
        Layout::Gray16,
        Layout::Nrgba32,
        Layout::Nrgba64,
        Layout::Rgba32,
        Layout::Rgba64,
    ];

    /// Layout operators compute in.
    pub const WORKING: Layout = Layout::Rgba32;

    /// Bytes per pixel.
    pub const fn byte_width(self) -> usize {
        match self {
            Layout::Unset => 0,
            Layout::Alpha8 | Layout::Gray8 => 1,
            Layout::Alpha16 | Layout::Gray16 => 2,
            Layout::Cmyk32 | Layout::Rgba32 | Layout::Nrgba32 => 4,
            Layout::Rgba64 | Layout::Nrgba64 => 8,
        }
    }

    /// Canonical upper-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Layout::Unset => "COLORNOOP",
            Layout::Alpha8 => "ALPHA",
            Layout::Alpha16 => "ALPHA16",
            Layout::Cmyk32 => "CMYK",
            Layout::Gray8 => "GRAY",
            Layout::Gray16 => "GRAY16",
            Layout::Nrgba32 => "NRGBA",
            Layout::Nrgba64 => "NRGBA64",
            Layout::Rgba32 => "RGBA",
            Layout::Rgba64 => "RGBA64",
        }
    }

    /// Returns `true` if pixels carry an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            Layout::Alpha8 | Layout::Alpha16 | Layout::Rgba32 | Layout::Rgba64 | Layout::Nrgba32 | Layout::Nrgba64
        )
    }

    /// Returns `true` for 16-bit channel layouts.
    pub const fn is_wide(self) -> bool {
        matches!(self, Layout::Alpha16 | Layout::Gray16 | Layout::Rgba64 | Layout::Nrgba64)
    }

    /// Converts any color into this layout.
    ///
    /// Colors already native to the layout are returned unchanged.
    pub fn convert(self, c: Color) -> Color {
        if c.layout() == self {
            return c;
        }
        Color::from_rgba16(self, c.rgba16())
    }

    /// Color read from an all-zero pixel; what out-of-bounds reads return.
    pub fn zero(self) -> Color {
        self.decode(&[0u8; 8])
    }

    /// Reads one pixel from the start of `px`.
    ///
    /// `px` must hold at least [`byte_width`](Self::byte_width) bytes.
    pub fn decode(self, px: &[u8]) -> Color {
        match self {
            Layout::Unset => Color::TRANSPARENT,
            Layout::Alpha8 => Color::Alpha(px[0]),
            Layout::Alpha16 => Color::Alpha16(be16(px, 0)),
            Layout::Gray8 => Color::Gray(px[0]),
            Layout::Gray16 => Color::Gray16(be16(px, 0)),
            Layout::Cmyk32 => Color::Cmyk([px[0], px[1], px[2], px[3]]),
            Layout::Rgba32 => Color::Rgba([px[0], px[1], px[2], px[3]]),
            Layout::Nrgba32 => Color::Nrgba([px[0], px[1], px[2], px[3]]),
            Layout::Rgba64 => Color::Rgba64(be16x4(px)),
            Layout::Nrgba64 => Color::Nrgba64(be16x4(px)),
        }
    }

    /// Converts `c` into this layout and writes it to the start of `px`.
    pub fn encode(self, c: Color, px: &mut [u8]) {
        if self == Layout::Unset {
            return;
        }
        match self.convert(c) {
            Color::Alpha(a) | Color::Gray(a) => px[0] = a,
            Color::Alpha16(a) | Color::Gray16(a) => px[..2].copy_from_slice(&a.to_be_bytes()),
            Color::Cmyk(v) | Color::Rgba(v) | Color::Nrgba(v) => px[..4].copy_from_slice(&v),
            Color::Rgba64(v) | Color::Nrgba64(v) => {
                for (i, c) in v.iter().enumerate() {
                    px[i * 2..i * 2 + 2].copy_from_slice(&c.to_be_bytes());
                }
            }
        }
    }

    /// Returns `true` if the pixel at the start of `px` is fully opaque.
    ///
    /// Layouts without alpha are always opaque.
    pub fn is_opaque_pixel(self, px: &[u8]) -> bool {
        match self {
            Layout::Alpha8 => px[0] == 0xff,
            Layout::Alpha16 => px[0] == 0xff && px[1] == 0xff,
            Layout::Rgba32 | Layout::Nrgba32 => px[3] == 0xff,
            Layout::Rgba64 | Layout::Nrgba64 => px[6] == 0xff && px[7] == 0xff,
            Layout::Unset | Layout::Gray8 | Layout::Gray16 | Layout::Cmyk32 => true,
        }
    }
}

#[inline]
fn be16(px: &[u8], i: usize) -> u16 {
    u16::from_be_bytes([px[i], px[i + 1]])
}

#[inline]
fn be16x4(px: &[u8]) -> [u16; 4] {
    [be16(px, 0), be16(px, 2), be16(px, 4), be16(px, 6)]
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Layout::ALL
            .into_iter()
            .find(|l| l.name() == upper)
            .ok_or_else(|| Error::unsupported_color_model(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_widths() {
        let widths: Vec<usize> = Layout::ALL.iter().map(|l| l.byte_width()).collect();
        assert_eq!(widths, vec![1, 2, 4, 1, 2, 4, 8, 4, 8]);
        assert_eq!(Layout::Unset.byte_width(), 0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("rgba".parse::<Layout>().unwrap(), Layout::Rgba32);
        assert_eq!("Gray16".parse::<Layout>().unwrap(), Layout::Gray16);
        assert_eq!("cmyk".parse::<Layout>().unwrap(), Layout::Cmyk32);
        let err = "ycbcr".parse::<Layout>().unwrap_err();
        assert_eq!(err, Error::UnsupportedColorModel("ycbcr".into()));
        assert!("colornoop".parse::<Layout>().is_err());
    }

    #[test]
    fn test_encode_decode_big_endian() {
        let mut px = [0u8; 8];
        Layout::Rgba64.encode(Color::Rgba64([0x1234, 0, 0, 0xffff]), &mut px);
        assert_eq!(&px[..2], &[0x12, 0x34]);
        assert_eq!(Layout::Rgba64.decode(&px), Color::Rgba64([0x1234, 0, 0, 0xffff]));

        let mut px = [0u8; 2];
        Layout::Gray16.encode(Color::Gray16(0xabcd), &mut px);
        assert_eq!(px, [0xab, 0xcd]);
    }

    #[test]
    fn test_unset_sentinel() {
        let mut px = [7u8; 4];
        Layout::Unset.encode(Color::WHITE, &mut px);
        assert_eq!(px, [7; 4]);
        assert_eq!(Layout::Unset.decode(&px), Color::TRANSPARENT);
    }

    #[test]
    fn test_opaque_pixel() {
        assert!(Layout::Rgba32.is_opaque_pixel(&[0, 0, 0, 255]));
        assert!(!Layout::Rgba64.is_opaque_pixel(&[0, 0, 0, 0, 0, 0, 0xff, 0xfe]));
        assert!(Layout::Cmyk32.is_opaque_pixel(&[0, 0, 0, 0]));
    }

    #[test]
    fn test_zero_colors() {
        assert_eq!(Layout::Cmyk32.zero().to_rgba(), [255, 255, 255, 255]);
        assert_eq!(Layout::Gray8.zero().to_rgba(), [0, 0, 0, 255]);
        assert_eq!(Layout::Rgba32.zero(), Color::TRANSPARENT);
    }
}
