//! Blending two buffers.
//!
//! A blend combines a background and a foreground color channel by channel,
//! then always composites the result over the background:
//!
//! ```text
//! c2     = mode(bg, fg)            (alpha of c2 = fg alpha)
//! out.rgb = c2.rgb * c2.a + bg.rgb * (1 - c2.a)
//! out.a   = bg.a + c2.a
//! ```
//!
//! Which buffer is the background is decided by [`BlendPosition`]. The
//! output covers the overlap of both buffers, anchored at their origins.
//!
//! # Example
//!
//! ```rust
//! use warhola_core::{Color, Layout, PixelBuffer};
//! use warhola_ops::blend::{blend, BlendMode, BlendPosition};
//! use warhola_ops::Executor;
//!
//! let mut base = PixelBuffer::scratch(Layout::Rgba32, 4, 4).unwrap();
//! base.fill(Color::BLACK);
//! let mut top = PixelBuffer::scratch(Layout::Rgba32, 2, 2).unwrap();
//! top.fill(Color::WHITE);
//!
//! let out = blend(&Executor::inline(), &base, &top, BlendPosition::Foreground, BlendMode::Normal, 0.0).unwrap();
//! assert_eq!(out.rect().dx(), 2);
//! assert_eq!(out.at(0, 0), Color::WHITE);
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};
use warhola_core::{Layout, PixelBuffer, Rgbaf};

use crate::parallel::Executor;
use crate::{OpsError, OpsResult, restore};

/// Which side the other buffer takes in a blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendPosition {
    /// The other buffer is laid over the source.
    Foreground,
    /// The source is laid over the other buffer.
    Background,
}

impl FromStr for BlendPosition {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fg" | "foreground" => Ok(BlendPosition::Foreground),
            "bg" | "background" => Ok(BlendPosition::Background),
            _ => Err(OpsError::UnsupportedBlendPosition(s.to_string())),
        }
    }
}

impl fmt::Display for BlendPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlendPosition::Foreground => "foreground",
            BlendPosition::Background => "background",
        })
    }
}

/// Per-channel blend formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Foreground over background.
    Normal,
    /// `bg + fg`
    Add,
    /// `bg * fg`
    Multiply,
    /// Multiply or screen depending on the background.
    Overlay,
    /// `(1 - 2fg) bg² + 2 bg fg`
    SoftLight,
    /// `1 - (1 - bg)(1 - fg)`
    Screen,
    /// `|bg - fg|`
    Difference,
    /// `bg / fg`, 1 where `fg` is 0
    Divide,
    /// `1 - (1 - bg) / fg`, 0 where `fg` is 0
    ColorBurn,
    /// `0.5 - 2 (bg - 0.5)(fg - 0.5)`
    Exclusion,
    /// `bg / (1 - fg)`, 1 where `fg` is 1
    ColorDodge,
    /// `bg + fg - 1`
    LinearBurn,
    /// `bg + 2fg - 0.5` above mid-gray, `bg + 2fg - 1` otherwise
    LinearLight,
    /// `fg - bg`
    Subtract,
    /// Mix toward the foreground by the option factor.
    Opacity,
    /// `min(bg, fg)`
    Darken,
    /// `max(bg, fg)`
    Lighten,
}

impl BlendMode {
    /// All modes.
    pub const ALL: [BlendMode; 17] = [
        BlendMode::Normal,
        BlendMode::Add,
        BlendMode::Multiply,
        BlendMode::Overlay,
        BlendMode::SoftLight,
        BlendMode::Screen,
        BlendMode::Difference,
        BlendMode::Divide,
        BlendMode::ColorBurn,
        BlendMode::Exclusion,
        BlendMode::ColorDodge,
        BlendMode::LinearBurn,
        BlendMode::LinearLight,
        BlendMode::Subtract,
        BlendMode::Opacity,
        BlendMode::Darken,
        BlendMode::Lighten,
    ];

    /// Lower-case name as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Add => "add",
            BlendMode::Multiply => "multiply",
            BlendMode::Overlay => "overlay",
            BlendMode::SoftLight => "softlight",
            BlendMode::Screen => "screen",
            BlendMode::Difference => "difference",
            BlendMode::Divide => "divide",
            BlendMode::ColorBurn => "colorburn",
            BlendMode::Exclusion => "exclusion",
            BlendMode::ColorDodge => "colordodge",
            BlendMode::LinearBurn => "linearburn",
            BlendMode::LinearLight => "linearlight",
            BlendMode::Subtract => "subtract",
            BlendMode::Opacity => "opacity",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
        }
    }

    /// Blends one channel. `opacity` is only read by [`BlendMode::Opacity`]
    /// and must already be clamped.
    fn channel(self, b: f64, f: f64, opacity: f64) -> f64 {
        match self {
            BlendMode::Normal => f,
            BlendMode::Add => b + f,
            BlendMode::Multiply => b * f,
            BlendMode::Overlay => {
                if b > 0.5 {
                    1.0 - (1.0 - 2.0 * (b - 0.5)) * (1.0 - f)
                } else {
                    2.0 * b * f
                }
            }
            BlendMode::SoftLight => (1.0 - 2.0 * f) * b * b + 2.0 * b * f,
            BlendMode::Screen => 1.0 - (1.0 - b) * (1.0 - f),
            BlendMode::Difference => (b - f).abs(),
            BlendMode::Divide => {
                if f == 0.0 {
                    1.0
                } else {
                    b / f
                }
            }
            BlendMode::ColorBurn => {
                if f == 0.0 {
                    0.0
                } else {
                    1.0 - (1.0 - b) / f
                }
            }
            BlendMode::Exclusion => 0.5 - 2.0 * (b - 0.5) * (f - 0.5),
            BlendMode::ColorDodge => {
                if f == 1.0 {
                    1.0
                } else {
                    b / (1.0 - f)
                }
            }
            BlendMode::LinearBurn => b + f - 1.0,
            BlendMode::LinearLight => {
                if f > 0.5 {
                    b + 2.0 * f - 0.5
                } else {
                    b + 2.0 * f - 1.0
                }
            }
            BlendMode::Subtract => f - b,
            BlendMode::Opacity => f * opacity + (1.0 - opacity) * b,
            BlendMode::Darken => b.min(f),
            BlendMode::Lighten => b.max(f),
        }
    }

    /// Blends two colors and composites the result over `bg`.
    pub fn apply(self, bg: Rgbaf, fg: Rgbaf, option: f64) -> Rgbaf {
        let opacity = option.clamp(0.0, 1.0);
        let c2 = Rgbaf::new(
            self.channel(bg.r, fg.r, opacity),
            self.channel(bg.g, fg.g, opacity),
            self.channel(bg.b, fg.b, opacity),
            fg.a,
        );
        Rgbaf::alpha_comp(bg, c2)
    }
}

impl FromStr for BlendMode {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        BlendMode::ALL
            .into_iter()
            .find(|m| m.name() == lower)
            .ok_or_else(|| OpsError::UnsupportedBlendAction(s.to_string()))
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Blends `src` with `other`.
///
/// `other` is first converted into `src`'s layout. `option` is the mix
/// factor for [`BlendMode::Opacity`] and ignored otherwise. The result has
/// `src`'s layout and the size of the overlap.
pub fn blend(
    exec: &Executor,
    src: &PixelBuffer,
    other: &PixelBuffer,
    position: BlendPosition,
    mode: BlendMode,
    option: f64,
) -> OpsResult<PixelBuffer> {
    trace!(%position, %mode, option, "blend");
    let other = other.clone_to(src.layout());

    let (bg, fg) = match position {
        BlendPosition::Foreground => (src, &other),
        BlendPosition::Background => (&other, src),
    };
    let w = bg.width().min(fg.width());
    let h = bg.height().min(fg.height());
    debug!(w, h, "blend overlap");

    let bg = bg.clone_to(Layout::Rgba32);
    let fg = fg.clone_to(Layout::Rgba32);
    let mut dst = src.scratch_like(Layout::Rgba32, w.max(0), h.max(0))?;
    if dst.is_empty() {
        return Ok(restore(dst, src));
    }

    let stride = dst.stride();
    let n = w as usize * 4;
    exec.rows(dst.bytes_mut(), stride, h as usize, |y, row| {
        let b_row = &bg.row(y)[..n];
        let f_row = &fg.row(y)[..n];
        for ((b, f), d) in b_row.chunks_exact(4).zip(f_row.chunks_exact(4)).zip(row.chunks_exact_mut(4)) {
            let out = mode.apply(
                Rgbaf::from_rgba8([b[0], b[1], b[2], b[3]]),
                Rgbaf::from_rgba8([f[0], f[1], f[2], f[3]]),
                option,
            );
            d.copy_from_slice(&out.to_rgba8());
        }
    });
    Ok(restore(dst, src))
}

/// Parses position and mode names, then blends.
pub fn blend_named(
    exec: &Executor,
    src: &PixelBuffer,
    other: &PixelBuffer,
    position: &str,
    mode: &str,
    option: f64,
) -> OpsResult<PixelBuffer> {
    let position: BlendPosition = position.parse()?;
    let mode: BlendMode = mode.parse()?;
    blend(exec, src, other, position, mode, option)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use warhola_core::Color;

    fn filled(w: i32, h: i32, c: [u8; 4]) -> PixelBuffer {
        let mut buf = PixelBuffer::scratch(Layout::Rgba32, w, h).unwrap();
        buf.fill(Color::Rgba(c));
        buf
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("SoftLight".parse::<BlendMode>().unwrap(), BlendMode::SoftLight);
        assert_eq!("bg".parse::<BlendPosition>().unwrap(), BlendPosition::Background);
        assert_eq!("Foreground".parse::<BlendPosition>().unwrap(), BlendPosition::Foreground);
        assert_eq!(
            "middle".parse::<BlendPosition>().unwrap_err().to_string(),
            "not a valid blend position: middle"
        );
        assert_eq!(
            "burn".parse::<BlendMode>().unwrap_err().to_string(),
            "not a valid blend action: burn"
        );
        for m in BlendMode::ALL {
            assert_eq!(m.name().parse::<BlendMode>().unwrap(), m);
        }
    }

    #[test]
    fn test_sentinels() {
        assert_relative_eq!(BlendMode::Divide.channel(0.3, 0.0, 0.0), 1.0);
        assert_relative_eq!(BlendMode::ColorBurn.channel(0.3, 0.0, 0.0), 0.0);
        assert_relative_eq!(BlendMode::ColorDodge.channel(0.3, 1.0, 0.0), 1.0);
        assert_relative_eq!(BlendMode::Opacity.channel(0.2, 0.6, 0.5), 0.4);
        assert_relative_eq!(BlendMode::Subtract.channel(0.2, 0.6, 0.0), 0.4);
    }

    #[test]
    fn test_transparent_foreground_keeps_background() {
        let base = filled(3, 3, [40, 90, 200, 255]);
        let clear = filled(3, 3, [0, 0, 0, 0]);
        for mode in BlendMode::ALL {
            let out = blend(&Executor::inline(), &base, &clear, BlendPosition::Foreground, mode, 0.5).unwrap();
            assert_eq!(out.packed(), base.packed(), "{mode}");
        }
    }

    #[test]
    fn test_opaque_foreground_replaces() {
        let base = filled(4, 4, [40, 90, 200, 255]);
        let top = filled(2, 3, [250, 10, 0, 255]);
        let out = blend(&Executor::inline(), &base, &top, BlendPosition::Foreground, BlendMode::Normal, 0.0).unwrap();
        assert_eq!(out.rect().dx(), 2);
        assert_eq!(out.rect().dy(), 3);
        assert_eq!(out.at(1, 2), Color::Rgba([250, 10, 0, 255]));
    }

    #[test]
    fn test_background_position_swaps() {
        let base = filled(2, 2, [255, 255, 255, 255]);
        let under = filled(2, 2, [0, 0, 0, 255]);
        let out = blend(&Executor::inline(), &base, &under, BlendPosition::Background, BlendMode::Normal, 0.0).unwrap();
        assert_eq!(out.at(0, 0), Color::WHITE);
        let out = blend(&Executor::inline(), &base, &under, BlendPosition::Foreground, BlendMode::Normal, 0.0).unwrap();
        assert_eq!(out.at(0, 0), Color::BLACK);
    }

    #[test]
    fn test_multiply_and_screen() {
        let base = filled(1, 1, [255, 0, 128, 255]);
        let top = filled(1, 1, [128, 255, 255, 255]);
        let exec = Executor::inline();
        let m = blend(&exec, &base, &top, BlendPosition::Foreground, BlendMode::Multiply, 0.0).unwrap();
        assert_eq!(m.at(0, 0), Color::Rgba([128, 0, 128, 255]));
        let s = blend(&exec, &base, &top, BlendPosition::Foreground, BlendMode::Screen, 0.0).unwrap();
        assert_eq!(s.at(0, 0), Color::Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_named_errors_before_work() {
        let base = filled(1, 1, [0; 4]);
        let err = blend_named(&Executor::inline(), &base, &base, "sideways", "normal", 0.0).unwrap_err();
        assert!(matches!(err, OpsError::UnsupportedBlendPosition(_)));
        let err = blend_named(&Executor::inline(), &base, &base, "fg", "glow", 0.0).unwrap_err();
        assert!(matches!(err, OpsError::UnsupportedBlendAction(_)));
    }
}
