//! Layout-native colors and conversions between them.
//!
//! Every [`Color`] converts to a common interchange value: 16-bit,
//! alpha-premultiplied RGBA with each channel in `0..=0xFFFF`. Conversion
//! into a target layout goes through that value (see
//! [`Layout::convert`](crate::Layout::convert)).
//!
//! # Float colors
//!
//! [`Rgbaf`] is the `0.0..=1.0` working color used by blending.
//!
//! # Hue space helpers
//!
//! [`rgb_to_hsl`], [`hsl_to_rgb`], [`rgb_to_hsv`] and [`hsv_to_rgb`] work on
//! 8-bit RGB triples. Hue is in degrees `0..360`, the other components are
//! in `0.0..=1.0`.

use crate::layout::Layout;

/// A color stored in the native representation of one channel layout.
///
/// Multi-byte variants hold their channels in `[r, g, b, a]` or
/// `[c, m, y, k]` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// 8-bit alpha only
    Alpha(u8),
    /// 16-bit alpha only
    Alpha16(u16),
    /// 8-bit luma
    Gray(u8),
    /// 16-bit luma
    Gray16(u16),
    /// 8-bit cyan, magenta, yellow, key
    Cmyk([u8; 4]),
    /// 8-bit alpha-premultiplied RGBA
    Rgba([u8; 4]),
    /// 16-bit alpha-premultiplied RGBA
    Rgba64([u16; 4]),
    /// 8-bit straight-alpha RGBA
    Nrgba([u8; 4]),
    /// 16-bit straight-alpha RGBA
    Nrgba64([u16; 4]),
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::Rgba([0, 0, 0, 0]);
    /// Opaque black.
    pub const BLACK: Color = Color::Rgba([0, 0, 0, 0xff]);
    /// Opaque white.
    pub const WHITE: Color = Color::Rgba([0xff, 0xff, 0xff, 0xff]);

    /// Layout this color is native to.
    pub const fn layout(&self) -> Layout {
        match self {
            Color::Alpha(_) => Layout::Alpha8,
            Color::Alpha16(_) => Layout::Alpha16,
            Color::Gray(_) => Layout::Gray8,
            Color::Gray16(_) => Layout::Gray16,
            Color::Cmyk(_) => Layout::Cmyk32,
            Color::Rgba(_) => Layout::Rgba32,
            Color::Rgba64(_) => Layout::Rgba64,
            Color::Nrgba(_) => Layout::Nrgba32,
            Color::Nrgba64(_) => Layout::Nrgba64,
        }
    }

    /// Interchange value: premultiplied RGBA, 16 bits per channel.
    pub fn rgba16(&self) -> [u32; 4] {
        match *self {
            Color::Alpha(a) => {
                let a = widen(a);
                [a, a, a, a]
            }
            Color::Alpha16(a) => {
                let a = a as u32;
                [a, a, a, a]
            }
            Color::Gray(y) => {
                let y = widen(y);
                [y, y, y, 0xffff]
            }
            Color::Gray16(y) => [y as u32, y as u32, y as u32, 0xffff],
            Color::Cmyk([c, m, y, k]) => {
                let w = 0xffff - widen(k);
                [
                    (0xffff - widen(c)) * w / 0xffff,
                    (0xffff - widen(m)) * w / 0xffff,
                    (0xffff - widen(y)) * w / 0xffff,
                    0xffff,
                ]
            }
            Color::Rgba([r, g, b, a]) => [widen(r), widen(g), widen(b), widen(a)],
            Color::Rgba64([r, g, b, a]) => [r as u32, g as u32, b as u32, a as u32],
            Color::Nrgba([r, g, b, a]) => {
                let a8 = a as u32;
                [
                    widen(r) * a8 / 0xff,
                    widen(g) * a8 / 0xff,
                    widen(b) * a8 / 0xff,
                    widen(a),
                ]
            }
            Color::Nrgba64([r, g, b, a]) => {
                let a16 = a as u32;
                [
                    r as u32 * a16 / 0xffff,
                    g as u32 * a16 / 0xffff,
                    b as u32 * a16 / 0xffff,
                    a16,
                ]
            }
        }
    }

    /// Converts to 8-bit premultiplied RGBA, the working representation of
    /// every operator.
    #[inline]
    pub fn to_rgba(&self) -> [u8; 4] {
        if let Color::Rgba(px) = *self {
            return px;
        }
        let [r, g, b, a] = self.rgba16();
        [(r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, (a >> 8) as u8]
    }

    /// Builds a color in `layout` from an interchange value.
    ///
    /// [`Layout::Unset`] yields [`Color::TRANSPARENT`].
    pub fn from_rgba16(layout: Layout, [r, g, b, a]: [u32; 4]) -> Color {
        match layout {
            Layout::Unset => Color::TRANSPARENT,
            Layout::Alpha8 => Color::Alpha((a >> 8) as u8),
            Layout::Alpha16 => Color::Alpha16(a as u16),
            Layout::Gray8 => Color::Gray(((19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 24) as u8),
            Layout::Gray16 => Color::Gray16(((19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 16) as u16),
            Layout::Cmyk32 => Color::Cmyk(rgb_to_cmyk((r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8)),
            Layout::Rgba32 => Color::Rgba([(r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, (a >> 8) as u8]),
            Layout::Rgba64 => Color::Rgba64([r as u16, g as u16, b as u16, a as u16]),
            Layout::Nrgba32 => {
                let [r, g, b, a] = unpremultiply([r, g, b, a]);
                Color::Nrgba([(r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, (a >> 8) as u8])
            }
            Layout::Nrgba64 => {
                let [r, g, b, a] = unpremultiply([r, g, b, a]);
                Color::Nrgba64([r as u16, g as u16, b as u16, a as u16])
            }
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

#[inline]
fn widen(v: u8) -> u32 {
    let v = v as u32;
    v | (v << 8)
}

fn unpremultiply([r, g, b, a]: [u32; 4]) -> [u32; 4] {
    match a {
        0xffff => [r, g, b, a],
        0 => [0, 0, 0, 0],
        _ => [
            (r * 0xffff / a).min(0xffff),
            (g * 0xffff / a).min(0xffff),
            (b * 0xffff / a).min(0xffff),
            a,
        ],
    }
}

/// Converts 8-bit RGB to CMYK.
///
/// Pure black maps to `[0, 0, 0, 0xff]`.
pub fn rgb_to_cmyk(r: u8, g: u8, b: u8) -> [u8; 4] {
    let (rr, gg, bb) = (r as u32, g as u32, b as u32);
    let w = rr.max(gg).max(bb);
    if w == 0 {
        return [0, 0, 0, 0xff];
    }
    [
        ((w - rr) * 0xff / w) as u8,
        ((w - gg) * 0xff / w) as u8,
        ((w - bb) * 0xff / w) as u8,
        (0xff - w) as u8,
    ]
}

/// Floating point RGBA with channels nominally in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgbaf {
    /// Red
    pub r: f64,
    /// Green
    pub g: f64,
    /// Blue
    pub b: f64,
    /// Alpha
    pub a: f64,
}

impl Rgbaf {
    /// Creates a float color from components.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Scales 8-bit channels into `0.0..=1.0`.
    pub fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, a as f64 / 255.0)
    }

    /// Clamps every channel to `0.0..=1.0`.
    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    /// Clamps and rounds to 8-bit channels.
    pub fn to_rgba8(self) -> [u8; 4] {
        let c = self.clamped();
        [unit_to_u8(c.r), unit_to_u8(c.g), unit_to_u8(c.b), unit_to_u8(c.a)]
    }

    /// Composites `fg` over `bg` using the foreground's alpha.
    ///
    /// The foreground is clamped first. The resulting alpha is the sum of
    /// both alphas and may exceed 1; callers clamp when storing.
    pub fn alpha_comp(bg: Rgbaf, fg: Rgbaf) -> Rgbaf {
        let fg = fg.clamped();
        let fa = fg.a;
        Rgbaf::new(
            fg.r * fa + (1.0 - fa) * bg.r,
            fg.g * fa + (1.0 - fa) * bg.g,
            fg.b * fa + (1.0 - fa) * bg.b,
            bg.a + fa,
        )
    }
}

fn hue_sector(r: f64, g: f64, b: f64, max: f64, delta: f64) -> f64 {
    let mut h = if r >= max {
        (g - b) / delta
    } else if g >= max {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    h *= 60.0;
    if h < 0.0 {
        h += 360.0;
    }
    h
}

#[inline]
fn unit_to_u8(v: f64) -> u8 {
    (v * 255.0 + 0.5).clamp(0.0, 255.0) as u8
}

/// Converts 8-bit RGB to hue, saturation and lightness.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    let max = r.max(g.max(b));
    let min = r.min(g.min(b));
    let delta = max - min;
    let l = (max + min) / 2.0;

    if delta <= 0.0 {
        return (0.0, 0.0, l);
    }

    let s = if l < 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };
    (hue_sector(r, g, b, max, delta), s, l)
}

/// Converts hue, saturation and lightness back to 8-bit RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    if s == 0.0 {
        let v = unit_to_u8(l);
        return [v, v, v];
    }

    let t0 = if l < 0.5 { l * (1.0 + s) } else { (l + s) - (s * l) };
    let t1 = 2.0 * l - t0;
    let h = h / 360.0;

    let channel = |mut v: f64| {
        if v < 0.0 {
            v += 1.0;
        } else if v > 1.0 {
            v -= 1.0;
        }
        if v < 1.0 / 6.0 {
            t1 + (t0 - t1) * 6.0 * v
        } else if v < 0.5 {
            t0
        } else if v < 2.0 / 3.0 {
            t1 + (t0 - t1) * (2.0 / 3.0 - v) * 6.0
        } else {
            t1
        }
    };

    [
        unit_to_u8(channel(h + 1.0 / 3.0)),
        unit_to_u8(channel(h)),
        unit_to_u8(channel(h - 1.0 / 3.0)),
    ]
}

/// Converts 8-bit RGB to hue, saturation and value.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    let max = r.max(g.max(b));
    let min = r.min(g.min(b));
    let delta = max - min;

    if max <= 0.0 {
        return (0.0, 0.0, max);
    }
    let s = delta / max;
    if delta == 0.0 {
        return (0.0, s, max);
    }
    (hue_sector(r, g, b, max, delta), s, max)
}

/// Converts hue, saturation and value back to 8-bit RGB.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [u8; 3] {
    if s == 0.0 {
        let v = unit_to_u8(v);
        return [v, v, v];
    }

    let h = h.rem_euclid(360.0) / 60.0;
    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i as i64 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [unit_to_u8(r), unit_to_u8(g), unit_to_u8(b)]
}
