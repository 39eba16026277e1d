//! Per-pixel color adjustments.
//!
//! Brightness, contrast and gamma build a 256-entry lookup table applied to
//! R, G and B. Hue and saturation round-trip every pixel through HSL. Alpha
//! is never changed.
//!
//! | kind         | range            |
//! |--------------|------------------|
//! | `brightness` | `-1.0..=1.0`     |
//! | `contrast`   | `-1.0..=1.0`     |
//! | `gamma`      | `> 0.0`          |
//! | `hue`        | `-360.0..=360.0` |
//! | `saturation` | `-1.0..=1.0`     |
//!
//! # Example
//!
//! ```rust
//! use warhola_core::{Color, Layout, PixelBuffer};
//! use warhola_ops::adjust::{adjust, Adjustment};
//! use warhola_ops::parallel::Executor;
//!
//! let mut buf = PixelBuffer::scratch(Layout::Rgba32, 2, 2).unwrap();
//! buf.fill(Color::Rgba([128, 128, 128, 255]));
//! let out = adjust(&Executor::inline(), &buf, Adjustment::Brightness, 1.0).unwrap();
//! assert_eq!(out.at(0, 0), Color::Rgba([255, 255, 255, 255]));
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};
use warhola_core::{Layout, PixelBuffer, hsl_to_rgb, rgb_to_hsl};

use crate::parallel::Executor;
use crate::{OpsError, OpsResult, restore};

/// Adjustment kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjustment {
    /// Scale channel values by `1 + amount`.
    Brightness,
    /// Spread values around mid-gray by `1 + amount`.
    Contrast,
    /// Raise normalized values to `1 / amount`.
    Gamma,
    /// Rotate hue by `amount` degrees.
    Hue,
    /// Scale HSL saturation by `1 + amount`.
    Saturation,
}

impl Adjustment {
    /// Every kind, in the order the CLI applies them.
    pub const ALL: [Adjustment; 5] = [
        Adjustment::Brightness,
        Adjustment::Contrast,
        Adjustment::Gamma,
        Adjustment::Hue,
        Adjustment::Saturation,
    ];

    /// Lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Adjustment::Brightness => "brightness",
            Adjustment::Contrast => "contrast",
            Adjustment::Gamma => "gamma",
            Adjustment::Hue => "hue",
            Adjustment::Saturation => "saturation",
        }
    }

    /// Accepted amount range, inclusive.
    pub fn range(self) -> (f64, f64) {
        match self {
            Adjustment::Brightness | Adjustment::Contrast | Adjustment::Saturation => (-1.0, 1.0),
            Adjustment::Gamma => (0.0, f64::INFINITY),
            Adjustment::Hue => (-360.0, 360.0),
        }
    }

    /// One-line help text.
    pub fn instruction(self) -> String {
        match self {
            Adjustment::Gamma => "Amount of gamma adjustment to apply, greater than 0".to_string(),
            a => {
                let (lo, hi) = a.range();
                format!("Amount of {} adjustment to apply, {lo} to {hi}", a.name())
            }
        }
    }

    fn lut(self, amount: f64) -> Option<[u8; 256]> {
        let f: Box<dyn Fn(f64) -> f64> = match self {
            Adjustment::Brightness => Box::new(move |i| i * (1.0 + amount)),
            Adjustment::Contrast => Box::new(move |i| (((i / 255.0) - 0.5) * (1.0 + amount) + 0.5) * 255.0),
            Adjustment::Gamma => {
                let gamma = amount.max(1e-5);
                Box::new(move |i| (i / 255.0).powf(1.0 / gamma) * 255.0)
            }
            Adjustment::Hue | Adjustment::Saturation => return None,
        };
        let mut lut = [0u8; 256];
        for (i, v) in lut.iter_mut().enumerate() {
            *v = f(i as f64).clamp(0.0, 255.0) as u8;
        }
        Some(lut)
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Adjustment {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Adjustment::ALL
            .into_iter()
            .find(|a| a.name() == lower)
            .ok_or_else(|| OpsError::UnsupportedAdjustment(s.to_string()))
    }
}

/// Applies one adjustment to every pixel.
///
/// `amount == 0` returns a copy without a pass over the pixels.
pub fn adjust(exec: &Executor, src: &PixelBuffer, kind: Adjustment, amount: f64) -> OpsResult<PixelBuffer> {
    trace!(%kind, amount, "adjust");
    if !amount.is_finite() {
        return Err(OpsError::InvalidParameter(format!("{kind} amount {amount}")));
    }
    if amount == 0.0 {
        debug!(%kind, "zero amount, skipping pass");
        return Ok(src.clone());
    }

    match kind.lut(amount) {
        Some(lut) => map_rgba(exec, src, move |[r, g, b, a]| {
            [lut[r as usize], lut[g as usize], lut[b as usize], a]
        }),
        None if kind == Adjustment::Hue => {
            let shift = amount.trunc() as i64;
            map_rgba(exec, src, move |[r, g, b, a]| {
                let (h, s, l) = rgb_to_hsl(r, g, b);
                let h = (h.trunc() as i64 + shift).rem_euclid(360) as f64;
                let [r, g, b] = hsl_to_rgb(h, s, l);
                [r, g, b, a]
            })
        }
        None => map_rgba(exec, src, move |[r, g, b, a]| {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            let s = (s * (1.0 + amount)).clamp(0.0, 1.0);
            let [r, g, b] = hsl_to_rgb(h, s, l);
            [r, g, b, a]
        }),
    }
}

/// Runs `f` over every pixel in the RGBA32 working layout and converts the
/// result back to the source layout.
pub fn map_rgba<F>(exec: &Executor, src: &PixelBuffer, f: F) -> OpsResult<PixelBuffer>
where
    F: Fn([u8; 4]) -> [u8; 4] + Sync,
{
    let work = src.clone_to(Layout::Rgba32);
    let mut dst = work.scratch_like(Layout::Rgba32, work.width(), work.height())?;
    let stride = dst.stride();
    exec.rows(dst.bytes_mut(), stride, work.height() as usize, |y, row| {
        let src_row = work.row(y);
        for (s, d) in src_row.chunks_exact(4).zip(row.chunks_exact_mut(4)) {
            d.copy_from_slice(&f([s[0], s[1], s[2], s[3]]));
        }
    });
    Ok(restore(dst, src))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warhola_core::Color;

    fn filled(c: [u8; 4]) -> PixelBuffer {
        let mut buf = PixelBuffer::scratch(Layout::Rgba32, 4, 4).unwrap();
        buf.fill(Color::Rgba(c));
        buf
    }

    #[test]
    fn test_parse() {
        assert_eq!("Gamma".parse::<Adjustment>().unwrap(), Adjustment::Gamma);
        assert!(matches!(
            "sharpness".parse::<Adjustment>(),
            Err(OpsError::UnsupportedAdjustment(_))
        ));
        assert!(Adjustment::Hue.instruction().contains("-360"));
    }

    #[test]
    fn test_luts() {
        let lut = Adjustment::Brightness.lut(1.0).unwrap();
        assert_eq!(lut[128], 255);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[100], 200);

        let lut = Adjustment::Contrast.lut(-1.0).unwrap();
        assert!(lut.iter().all(|&v| v == 127));

        let lut = Adjustment::Gamma.lut(2.0).unwrap();
        assert_eq!(lut[0], 0);
        assert_eq!(lut[255], 255);
        assert!(lut[64] > 64);
    }

    #[test]
    fn test_brightness_mid_gray() {
        let out = adjust(&Executor::inline(), &filled([128, 128, 128, 200]), Adjustment::Brightness, 1.0).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.at(x, y), Color::Rgba([255, 255, 255, 200]));
            }
        }
    }

    #[test]
    fn test_zero_amount_is_identity() {
        let src = filled([10, 120, 240, 255]);
        for kind in Adjustment::ALL {
            let out = adjust(&Executor::inline(), &src, kind, 0.0).unwrap();
            assert_eq!(out.packed(), src.packed(), "{kind}");
        }
    }

    #[test]
    fn test_hue_full_turn() {
        let src = filled([255, 0, 0, 255]);
        let out = adjust(&Executor::inline(), &src, Adjustment::Hue, 120.0).unwrap();
        assert_eq!(out.at(0, 0), Color::Rgba([0, 255, 0, 255]));
        let out = adjust(&Executor::inline(), &src, Adjustment::Hue, -120.0).unwrap();
        assert_eq!(out.at(0, 0), Color::Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_desaturate() {
        let src = filled([200, 40, 40, 255]);
        let out = adjust(&Executor::inline(), &src, Adjustment::Saturation, -1.0).unwrap();
        let [r, g, b, a] = out.at(1, 1).to_rgba();
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_layout_preserved() {
        let src = filled([100, 100, 100, 255]).clone_to(Layout::Gray8);
        let out = adjust(&Executor::inline(), &src, Adjustment::Brightness, 0.5).unwrap();
        assert_eq!(out.layout(), Layout::Gray8);
        assert_eq!(out.at(0, 0), Color::Gray(150));
    }

    #[test]
    fn test_rejects_nan() {
        assert!(adjust(&Executor::inline(), &filled([0; 4]), Adjustment::Gamma, f64::NAN).is_err());
    }
}
